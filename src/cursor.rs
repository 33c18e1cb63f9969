// MIT License - Copyright (c) 2026 Peter Wright
// Lazy, forward-only iteration over the controller's object tables

use tracing::debug;

use crate::constants::ObjectType;
use crate::error::OperationError;
use crate::filter::ObjectFilter;
use crate::protocol::{ObjectRecord, Request, Response};
use crate::session::Session;

/// Walks "next object of this type after N" queries until the controller
/// reports there are no more.
///
/// Filters are sent with each request and re-checked on the records that
/// come back, since not every firmware honours them. The cursor never
/// restarts: once it returns `None` or an error it stays exhausted.
pub struct ObjectCursor<'a> {
    session: &'a Session,
    object_type: ObjectType,
    filter: ObjectFilter,
    cursor: u16,
    exhausted: bool,
}

impl<'a> ObjectCursor<'a> {
    pub fn open(session: &'a Session, object_type: ObjectType, filter: ObjectFilter) -> Self {
        Self {
            session,
            object_type,
            filter,
            cursor: 0,
            exhausted: false,
        }
    }

    /// Number of the last object returned by the controller.
    pub fn position(&self) -> u16 {
        self.cursor
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Fetch the next matching record.
    pub async fn next(&mut self) -> Result<Option<ObjectRecord>, OperationError> {
        while !self.exhausted {
            match self.fetch().await {
                Ok(Some(record)) => {
                    if self.filter.matches(&record) {
                        return Ok(Some(record));
                    }
                    debug!(
                        "Skipping {} #{} excluded by filter",
                        self.object_type.as_str(),
                        record.number
                    );
                }
                Ok(None) => self.exhausted = true,
                Err(e) => {
                    self.exhausted = true;
                    return Err(e);
                }
            }
        }
        Ok(None)
    }

    async fn fetch(&mut self) -> Result<Option<ObjectRecord>, OperationError> {
        let response = self
            .session
            .request(Request::ObjectProperties {
                object_type: self.object_type,
                after: self.cursor,
                filter: self.filter,
            })
            .await?;

        match response {
            Response::Properties(record) => {
                if record.object_type() != self.object_type {
                    return Err(OperationError::invalid(format!(
                        "requested {} properties, got {}",
                        self.object_type.as_str(),
                        record.object_type().as_str()
                    )));
                }
                if record.number <= self.cursor {
                    return Err(OperationError::invalid(format!(
                        "{} #{} does not advance past cursor {}",
                        self.object_type.as_str(),
                        record.number,
                        self.cursor
                    )));
                }
                self.cursor = record.number;
                Ok(Some(record))
            }
            Response::EndOfData | Response::Nak => Ok(None),
            other => Err(OperationError::invalid(format!(
                "unexpected {} response to property query",
                other.kind()
            ))),
        }
    }

    /// Drain the cursor into a vector.
    pub async fn collect_all(mut self) -> Result<Vec<ObjectRecord>, OperationError> {
        let mut records = Vec::new();
        while let Some(record) = self.next().await? {
            records.push(record);
        }
        Ok(records)
    }
}
