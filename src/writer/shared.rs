use std::sync::{Arc, Mutex, MutexGuard};

use crate::locator::DocumentLocator;
use crate::model::Statement;
use crate::writer::{ExtractionContext, HandlerError, TripleHandler};

/// Cloneable handle that lets concurrent runs feed one sink.
///
/// Every call takes the lock for its own duration only, so statements from
/// different documents may interleave.
pub struct SharedHandler<H> {
    inner: Arc<Mutex<H>>,
}

impl<H> Clone for SharedHandler<H> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<H: TripleHandler> SharedHandler<H> {
    pub fn new(handler: H) -> Self {
        Self {
            inner: Arc::new(Mutex::new(handler)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, H>, HandlerError> {
        self.inner.lock().map_err(|_| HandlerError::Poisoned)
    }

    /// Returns the wrapped handler once every other clone is gone.
    pub fn try_unwrap(self) -> Result<H, Self> {
        match Arc::try_unwrap(self.inner) {
            Ok(mutex) => mutex.into_inner().map_err(|poisoned| Self {
                inner: Arc::new(Mutex::new(poisoned.into_inner())),
            }),
            Err(inner) => Err(Self { inner }),
        }
    }
}

impl<H: TripleHandler> TripleHandler for SharedHandler<H> {
    fn open_context(&mut self, context: &ExtractionContext) -> Result<(), HandlerError> {
        self.lock()?.open_context(context)
    }

    fn receive_statement(
        &mut self,
        context: &ExtractionContext,
        statement: &Statement,
    ) -> Result<(), HandlerError> {
        self.lock()?.receive_statement(context, statement)
    }

    fn receive_namespace(
        &mut self,
        context: &ExtractionContext,
        prefix: &str,
        iri: &str,
    ) -> Result<(), HandlerError> {
        self.lock()?.receive_namespace(context, prefix, iri)
    }

    fn close_context(&mut self, context: &ExtractionContext) -> Result<(), HandlerError> {
        self.lock()?.close_context(context)
    }

    fn end_document(&mut self, document: &DocumentLocator) -> Result<(), HandlerError> {
        self.lock()?.end_document(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Term;
    use crate::writer::CountingHandler;
    use std::thread;

    #[test]
    fn test_shared_across_threads() {
        let shared = SharedHandler::new(CountingHandler::new());

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let mut handler = shared.clone();
                thread::spawn(move || {
                    let ctx = ExtractionContext::new(
                        DocumentLocator::parse(&format!("http://example.com/{i}")).unwrap(),
                        "test",
                    );
                    let statement = Statement::new(
                        Term::from(&ctx.document),
                        "http://example.com/p",
                        Term::literal("v"),
                    );
                    handler.open_context(&ctx).unwrap();
                    handler.receive_statement(&ctx, &statement).unwrap();
                    handler.close_context(&ctx).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let counts = shared.try_unwrap().ok().unwrap();
        assert_eq!(counts.statements, 4);
        assert_eq!(counts.contexts, 4);
    }
}
