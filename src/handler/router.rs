//! Frame sink that routes ASCII frames through a command table and raw
//! frames to a dedicated handler.

use super::registry::{CommandTable, Handler};
use crate::protocol::{Frame, FrameSink};
use crate::writer::Outbound;

/// Owns the application context and routes completed frames to it.
pub struct Router<'a, C> {
    table: CommandTable<'a, C>,
    on_raw: Option<Handler<C>>,
    ctx: C,
}

impl<'a, C> Router<'a, C> {
    /// Route frames through `table`.
    ///
    /// Until [`on_raw`](Self::on_raw) installs a raw handler, raw frames go
    /// through the table as well, keyed on their opcode byte.
    pub fn new(table: CommandTable<'a, C>, ctx: C) -> Self {
        Self {
            table,
            on_raw: None,
            ctx,
        }
    }

    /// Hand raw frames (full frame, header included) to `handler`.
    pub fn on_raw(mut self, handler: Handler<C>) -> Self {
        self.on_raw = Some(handler);
        self
    }

    /// The application context.
    pub fn ctx(&self) -> &C {
        &self.ctx
    }

    /// Mutable access to the application context.
    pub fn ctx_mut(&mut self) -> &mut C {
        &mut self.ctx
    }

    /// Consume the router, returning the context.
    pub fn into_ctx(self) -> C {
        self.ctx
    }
}

impl<C> FrameSink for Router<'_, C> {
    fn on_frame(&mut self, frame: Frame<'_>, out: &mut dyn Outbound) {
        match frame {
            Frame::Ascii(bytes) => {
                self.table.dispatch(bytes, &mut self.ctx, out);
            }
            Frame::Raw(bytes) => match self.on_raw {
                Some(handler) => handler(&mut self.ctx, bytes, out),
                None => {
                    self.table.dispatch(bytes, &mut self.ctx, out);
                }
            },
        }
    }
}
