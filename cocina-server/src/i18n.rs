use cocina::LocaleCode;
use serde::Serialize;

/// Interface text for one language.
#[derive(Debug, Serialize)]
pub struct UiStrings {
    pub site_title: &'static str,
    pub tagline: &'static str,
    pub home: &'static str,
    pub all_recipes: &'static str,
    pub featured: &'static str,
    pub no_featured: &'static str,
    pub view_all: &'static str,
    pub view_recipe: &'static str,
    pub search_label: &'static str,
    pub search_placeholder: &'static str,
    pub category_label: &'static str,
    pub all_categories: &'static str,
    /// `{shown}` and `{total}` are filled in by the filter script.
    pub showing: &'static str,
    pub no_results: &'static str,
    pub minutes: &'static str,
    pub cooking_time: &'static str,
    pub difficulty: &'static str,
    pub category: &'static str,
    pub description: &'static str,
    pub ingredients: &'static str,
    pub instructions: &'static str,
    pub back_to_recipes: &'static str,
    pub language: &'static str,
    pub easy: &'static str,
    pub medium: &'static str,
    pub hard: &'static str,
    pub share_twitter: &'static str,
    pub newsletter_title: &'static str,
    pub newsletter_placeholder: &'static str,
    pub subscribe: &'static str,
    pub subscribing: &'static str,
    pub invalid_email: &'static str,
    pub subscribed: &'static str,
    pub subscribed_detail: &'static str,
}

static EN: UiStrings = UiStrings {
    site_title: "Cocina",
    tagline: "Recipes from around the world",
    home: "Home",
    all_recipes: "All Recipes",
    featured: "Featured Recipes",
    no_featured: "No featured recipes yet. Check back soon!",
    view_all: "View all recipes",
    view_recipe: "View Recipe",
    search_label: "Search Recipes",
    search_placeholder: "Search by title...",
    category_label: "Filter by Category",
    all_categories: "All Categories",
    showing: "Showing {shown} of {total} recipes",
    no_results: "No recipes match your search.",
    minutes: "min",
    cooking_time: "Cooking time",
    difficulty: "Difficulty",
    category: "Category",
    description: "Description",
    ingredients: "Ingredients",
    instructions: "Instructions",
    back_to_recipes: "Back to all recipes",
    language: "Language",
    easy: "Easy",
    medium: "Medium",
    hard: "Hard",
    share_twitter: "Share on Twitter",
    newsletter_title: "Get new recipes by email",
    newsletter_placeholder: "Enter your email address",
    subscribe: "Subscribe",
    subscribing: "Subscribing...",
    invalid_email: "Please enter a valid email address",
    subscribed: "Thank you for subscribing!",
    subscribed_detail: "You'll receive our latest recipes and updates.",
};

static ES: UiStrings = UiStrings {
    site_title: "Cocina",
    tagline: "Recetas de todo el mundo",
    home: "Inicio",
    all_recipes: "Todas las recetas",
    featured: "Recetas destacadas",
    no_featured: "Todavía no hay recetas destacadas. ¡Vuelve pronto!",
    view_all: "Ver todas las recetas",
    view_recipe: "Ver receta",
    search_label: "Buscar recetas",
    search_placeholder: "Buscar por título...",
    category_label: "Filtrar por categoría",
    all_categories: "Todas las categorías",
    showing: "Mostrando {shown} de {total} recetas",
    no_results: "Ninguna receta coincide con tu búsqueda.",
    minutes: "min",
    cooking_time: "Tiempo de cocción",
    difficulty: "Dificultad",
    category: "Categoría",
    description: "Descripción",
    ingredients: "Ingredientes",
    instructions: "Instrucciones",
    back_to_recipes: "Volver a todas las recetas",
    language: "Idioma",
    easy: "Fácil",
    medium: "Media",
    hard: "Difícil",
    share_twitter: "Compartir en Twitter",
    newsletter_title: "Recibe nuevas recetas por correo",
    newsletter_placeholder: "Introduce tu correo electrónico",
    subscribe: "Suscribirse",
    subscribing: "Suscribiendo...",
    invalid_email: "Introduce un correo electrónico válido",
    subscribed: "¡Gracias por suscribirte!",
    subscribed_detail: "Recibirás nuestras últimas recetas y novedades.",
};

static FR: UiStrings = UiStrings {
    site_title: "Cocina",
    tagline: "Des recettes du monde entier",
    home: "Accueil",
    all_recipes: "Toutes les recettes",
    featured: "Recettes à la une",
    no_featured: "Pas encore de recettes à la une. Revenez bientôt !",
    view_all: "Voir toutes les recettes",
    view_recipe: "Voir la recette",
    search_label: "Rechercher des recettes",
    search_placeholder: "Rechercher par titre...",
    category_label: "Filtrer par catégorie",
    all_categories: "Toutes les catégories",
    showing: "{shown} recettes sur {total}",
    no_results: "Aucune recette ne correspond à votre recherche.",
    minutes: "min",
    cooking_time: "Temps de cuisson",
    difficulty: "Difficulté",
    category: "Catégorie",
    description: "Description",
    ingredients: "Ingrédients",
    instructions: "Instructions",
    back_to_recipes: "Retour à toutes les recettes",
    language: "Langue",
    easy: "Facile",
    medium: "Moyen",
    hard: "Difficile",
    share_twitter: "Partager sur Twitter",
    newsletter_title: "Recevez nos nouvelles recettes par e-mail",
    newsletter_placeholder: "Saisissez votre adresse e-mail",
    subscribe: "S'abonner",
    subscribing: "Abonnement...",
    invalid_email: "Veuillez saisir une adresse e-mail valide",
    subscribed: "Merci pour votre abonnement !",
    subscribed_detail: "Vous recevrez nos dernières recettes et nouveautés.",
};

pub fn strings(locale: LocaleCode) -> &'static UiStrings {
    match locale {
        LocaleCode::En => &EN,
        LocaleCode::Es => &ES,
        LocaleCode::Fr => &FR,
    }
}

/// One entry of the language switcher.
#[derive(Debug, Serialize)]
pub struct Alternate {
    pub code: &'static str,
    pub name: &'static str,
    /// Site-relative link to the same page in this language.
    pub href: String,
    pub current: bool,
}

/// The page at `base_path` in every language, for the switcher and `hreflang` links.
pub fn alternates(base_path: &str, current: LocaleCode) -> Vec<Alternate> {
    LocaleCode::ALL
        .into_iter()
        .map(|locale| Alternate {
            code: locale.as_str(),
            name: locale.native_name(),
            href: locale.localize_path(base_path),
            current: locale == current,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switcher_links_the_same_page() {
        let links = alternates("/recipes/pasta", LocaleCode::Fr);
        let hrefs: Vec<&str> = links.iter().map(|a| a.href.as_str()).collect();
        assert_eq!(hrefs, ["/recipes/pasta", "/es/recipes/pasta", "/fr/recipes/pasta"]);
        assert!(links[2].current && !links[0].current);
        assert_eq!(links[1].name, "Español");
    }

    #[test]
    fn every_locale_has_strings() {
        for locale in LocaleCode::ALL {
            assert!(!strings(locale).all_recipes.is_empty());
        }
        assert_eq!(strings(LocaleCode::Es).hard, "Difícil");
    }
}
