use crate::{
    Driver, QueryResult, Result, RowLabeled, RowsAffected, Statement, Value,
    stream::{self, Stream, StreamExt, TryStreamExt},
};
use std::future::Future;

pub trait Executor: Send {
    type Driver: Driver;

    fn driver(&self) -> &Self::Driver;

    /// General method to send any statement and return any result type (either row or count)
    fn run(&mut self, statement: Statement) -> impl Stream<Item = Result<QueryResult>> + Send;

    /// Execute the statement and returns the rows.
    fn fetch(&mut self, statement: Statement) -> impl Stream<Item = Result<RowLabeled>> + Send {
        self.run(statement).filter_map(|v| async move {
            match v {
                Ok(QueryResult::Row(v)) => Some(Ok(v)),
                Err(e) => Some(Err(e)),
                _ => None,
            }
        })
    }

    /// Execute the statement and return the total number of rows affected.
    fn execute(
        &mut self,
        statement: Statement,
    ) -> impl Future<Output = Result<RowsAffected>> + Send {
        self.run(statement)
            .filter_map(|v| async move {
                match v {
                    Ok(QueryResult::Affected(v)) => Some(Ok(v)),
                    Err(e) => Some(Err(e)),
                    _ => None,
                }
            })
            .try_collect()
    }

    /// First value of the first row, `None` when there are no rows.
    fn fetch_scalar(
        &mut self,
        statement: Statement,
    ) -> impl Future<Output = Result<Option<Value>>> + Send {
        let stream = self.fetch(statement);
        async move {
            let mut stream = std::pin::pin!(stream);
            Ok(stream
                .try_next()
                .await?
                .and_then(|row| row.values.into_vec().into_iter().next()))
        }
    }
}

/// An executor that blocks the calling thread until the results are available.
pub trait BlockingExecutor: Send {
    type Driver: Driver;

    fn driver(&self) -> &Self::Driver;

    fn run_blocking(&mut self, statement: Statement) -> Result<Vec<QueryResult>>;
}

/// Exposes a [`BlockingExecutor`] as an [`Executor`], the statements it
/// receives are the same the asynchronous path would produce.
#[derive(Debug, Clone)]
pub struct Blocking<B>(pub B);

impl<B: BlockingExecutor> Executor for Blocking<B> {
    type Driver = B::Driver;

    fn driver(&self) -> &Self::Driver {
        self.0.driver()
    }

    fn run(&mut self, statement: Statement) -> impl Stream<Item = Result<QueryResult>> + Send {
        let results = match self.0.run_blocking(statement) {
            Ok(results) => results.into_iter().map(Ok).collect::<Vec<_>>(),
            Err(e) => vec![Err(e)],
        };
        stream::iter(results)
    }
}
