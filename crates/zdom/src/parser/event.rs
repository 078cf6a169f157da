//! Lexical events consumed by the tree builder

/// Events emitted by the streaming XML lexer
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Start tag, with attributes in source order
    Open {
        name: String,
        attributes: Vec<(String, String)>,
    },
    /// Character data with entity references already decoded
    Text(String),
    /// End tag (also emitted right after a self-closing start tag)
    Close { name: String },
}

impl Event {
    /// Start tag without attributes
    pub fn open(name: impl Into<String>) -> Self {
        Self::Open {
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn close(name: impl Into<String>) -> Self {
        Self::Close { name: name.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_constructors() {
        assert_eq!(
            Event::open("a"),
            Event::Open {
                name: "a".to_string(),
                attributes: Vec::new()
            }
        );
        assert_eq!(Event::text("x"), Event::Text("x".to_string()));
        assert_ne!(Event::close("a"), Event::open("a"));
    }
}
