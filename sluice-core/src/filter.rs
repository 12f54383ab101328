use crate::{
    Driver, Executor, QueryResult, Result, RowsAffected, Statement,
    stream::{self, Stream, StreamExt},
};
use std::collections::VecDeque;

/// Interception hook seeing every statement before it reaches the executor.
///
/// Returning `Some` replaces the execution with the given results.
pub trait ResultsFilter: Send {
    fn filter(&mut self, statement: &Statement) -> Option<Vec<QueryResult>>;
}

impl<F> ResultsFilter for F
where
    F: FnMut(&Statement) -> Option<Vec<QueryResult>> + Send,
{
    fn filter(&mut self, statement: &Statement) -> Option<Vec<QueryResult>> {
        self(statement)
    }
}

/// Executor routing every statement through a [`ResultsFilter`] first.
pub struct Filtered<E, F> {
    pub executor: E,
    pub filter: F,
}

impl<E, F> Filtered<E, F> {
    pub fn new(executor: E, filter: F) -> Self {
        Self { executor, filter }
    }
}

impl<E: Executor, F: ResultsFilter> Executor for Filtered<E, F> {
    type Driver = E::Driver;

    fn driver(&self) -> &Self::Driver {
        self.executor.driver()
    }

    fn run(&mut self, statement: Statement) -> impl Stream<Item = Result<QueryResult>> + Send {
        match self.filter.filter(&statement) {
            Some(results) => {
                log::trace!("Statement intercepted:\n{}", statement);
                stream::iter(results.into_iter().map(Ok)).left_stream()
            }
            None => self.executor.run(statement).right_stream(),
        }
    }
}

type Responder = Box<dyn FnMut(&Statement) -> Option<Vec<QueryResult>> + Send>;

/// Executor that never reaches a database: it records the statements and
/// answers with queued results, an optional responder, or nothing.
///
/// Without a prepared answer queries return no rows and other statements
/// affect no rows.
pub struct Capture<D> {
    driver: D,
    statements: Vec<Statement>,
    queue: VecDeque<Vec<QueryResult>>,
    responder: Option<Responder>,
}

impl<D: Driver> Capture<D> {
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            statements: Vec::new(),
            queue: VecDeque::new(),
            responder: None,
        }
    }

    /// Results of the next statement without a responder answer.
    pub fn push_results(&mut self, results: impl IntoIterator<Item = QueryResult>) -> &mut Self {
        self.queue.push_back(results.into_iter().collect());
        self
    }

    /// Next statement affects `rows` rows.
    pub fn push_affected(&mut self, rows: u64) -> &mut Self {
        self.push_results([RowsAffected::new(rows).into()])
    }

    pub fn respond_with<F>(&mut self, responder: F) -> &mut Self
    where
        F: FnMut(&Statement) -> Option<Vec<QueryResult>> + Send + 'static,
    {
        self.responder = Some(Box::new(responder));
        self
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn last_statement(&self) -> Option<&Statement> {
        self.statements.last()
    }

    /// Recorded statements, leaving the record empty.
    pub fn take_statements(&mut self) -> Vec<Statement> {
        std::mem::take(&mut self.statements)
    }

    fn answer(&mut self, statement: &Statement) -> Vec<QueryResult> {
        if let Some(responder) = &mut self.responder
            && let Some(results) = responder(statement)
        {
            return results;
        }
        if let Some(results) = self.queue.pop_front() {
            return results;
        }
        if statement.is_query() {
            Vec::new()
        } else {
            vec![RowsAffected::new(0).into()]
        }
    }
}

impl<D: Driver> Executor for Capture<D> {
    type Driver = D;

    fn driver(&self) -> &Self::Driver {
        &self.driver
    }

    fn run(&mut self, statement: Statement) -> impl Stream<Item = Result<QueryResult>> + Send {
        log::debug!("Captured:\n{}", statement);
        let results = self.answer(&statement);
        self.statements.push(statement);
        stream::iter(results.into_iter().map(Ok))
    }
}
