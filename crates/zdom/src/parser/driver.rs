//! XML parser: drives the lexer into the tree builder

use tracing::debug;

use crate::dom::Document;
use crate::error::{Error, ErrorKind, Result, Span};
use crate::lexer::XmlLexer;
use crate::parser::{Config, Event, TreeBuilder};

/// XML parser with depth and size limits
#[derive(Debug)]
pub struct Parser<'a> {
    lexer: XmlLexer<'a>,
    config: Config,
    len: usize,
}

impl<'a> Parser<'a> {
    /// Create a new parser with default configuration
    pub fn new(input: &'a [u8]) -> Self {
        Self::with_config(input, Config::default())
    }

    /// Create a new parser with custom configuration
    pub fn with_config(input: &'a [u8], config: Config) -> Self {
        Self {
            lexer: XmlLexer::new(input),
            config,
            len: input.len(),
        }
    }

    /// Parse the whole input into a document.
    ///
    /// Nothing is returned on failure: the partial tree is dropped.
    pub fn parse(&mut self) -> Result<Document> {
        if self.config.size_exceeded(self.len) {
            return Err(Error::at(
                ErrorKind::MaxSizeExceeded {
                    max: self.config.max_size,
                },
                self.len,
                0,
                0,
            ));
        }

        debug!(bytes = self.len, "parsing xml");
        let mut builder = TreeBuilder::new();
        let mut depth = 0usize;
        while let Some(event) = self.lexer.next_event()? {
            match &event {
                Event::Open { .. } => {
                    depth += 1;
                    if self.config.depth_exceeded(depth) {
                        let pos = self.lexer.position();
                        return Err(Error::new(
                            ErrorKind::MaxDepthExceeded {
                                max: self.config.max_depth,
                            },
                            Span::new(pos, pos),
                        ));
                    }
                }
                Event::Close { .. } => depth = depth.saturating_sub(1),
                Event::Text(_) => {}
            }

            let pos = self.lexer.position();
            builder.handle(event).map_err(|err| {
                if err.span().is_empty() {
                    Error::with_message(err.kind().clone(), Span::new(pos, pos), err.message())
                } else {
                    err
                }
            })?;
        }

        let document = builder.finish()?;
        debug!(nodes = document.len(), "parsed xml");
        Ok(document)
    }
}
