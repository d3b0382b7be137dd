use serde::Serialize;

/// A structured rich-content document, independent of which CMS produced it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RichDocument {
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Paragraph { spans: Vec<Span> },
    Heading { level: u8, spans: Vec<Span> },
    Quote { spans: Vec<Span> },
    List { ordered: bool, items: Vec<Vec<Span>> },
}

/// A run of text sharing the same inline marks.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Span {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub link: Option<String>,
}

impl Span {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

impl Block {
    /// Headings deeper than level 3 are rendered as level 3.
    pub fn heading(level: u8, spans: Vec<Span>) -> Self {
        Block::Heading {
            level: level.clamp(1, 3),
            spans,
        }
    }

    fn plain_text(&self) -> String {
        let join = |spans: &[Span]| spans.iter().map(|s| s.text.as_str()).collect::<String>();
        match self {
            Block::Paragraph { spans } | Block::Heading { spans, .. } | Block::Quote { spans } => {
                join(spans)
            }
            Block::List { items, .. } => items
                .iter()
                .map(|item| join(item))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

impl RichDocument {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Append one list item, extending the previous list block when it has the same kind.
    ///
    /// Some CMSes store list items as flat sibling blocks; this regroups them.
    pub fn push_list_item(&mut self, ordered: bool, item: Vec<Span>) {
        if let Some(Block::List {
            ordered: last_ordered,
            items,
        }) = self.blocks.last_mut()
        {
            if *last_ordered == ordered {
                items.push(item);
                return;
            }
        }
        self.blocks.push(Block::List {
            ordered,
            items: vec![item],
        });
    }

    /// The document's text without markup, one line per block or list item.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(Block::plain_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_items_of_the_same_kind_are_grouped() {
        let mut doc = RichDocument::default();
        doc.push_list_item(false, vec![Span::plain("flour")]);
        doc.push_list_item(false, vec![Span::plain("water")]);
        doc.push_list_item(true, vec![Span::plain("mix")]);

        assert_eq!(doc.blocks.len(), 2);
        assert_eq!(
            doc.blocks[0],
            Block::List {
                ordered: false,
                items: vec![vec![Span::plain("flour")], vec![Span::plain("water")]],
            }
        );
    }

    #[test]
    fn headings_clamp_to_three_levels() {
        assert_eq!(
            Block::heading(5, vec![]),
            Block::Heading {
                level: 3,
                spans: vec![]
            }
        );
        assert_eq!(
            Block::heading(0, vec![]),
            Block::Heading {
                level: 1,
                spans: vec![]
            }
        );
    }

    #[test]
    fn plain_text_joins_blocks() {
        let doc = RichDocument::new(vec![
            Block::heading(1, vec![Span::plain("Sauce")]),
            Block::Paragraph {
                spans: vec![
                    Span::plain("Stir "),
                    Span {
                        text: "gently".into(),
                        italic: true,
                        ..Default::default()
                    },
                ],
            },
        ]);
        assert_eq!(doc.plain_text(), "Sauce\nStir gently");
    }
}
