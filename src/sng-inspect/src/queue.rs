//! Destination queue walking
//!
//! A `LogQueueFifo` keeps its overflow messages on two intrusive lists, the
//! wait subqueue and the output subqueue. Each list head is a sentinel
//! embedded in the fifo; the number of nodes on it is a separate counter
//! and is the only thing that decides how far the walk goes.

use crate::address::{kind, Address};
use crate::error::Result;
use crate::payload::{decode_message_field, FieldValue, StaticField};
use crate::target::Target;
use crate::walk::{bounded_walk, Cancellation};

/// The two overflow lists of a fifo queue, in drain order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subqueue {
    Wait,
    Output,
}

impl Subqueue {
    pub const ALL: [Subqueue; 2] = [Subqueue::Wait, Subqueue::Output];

    pub fn name(self) -> &'static str {
        match self {
            Subqueue::Wait => "qoverflow_wait",
            Subqueue::Output => "qoverflow_output",
        }
    }
}

/// Locate a subqueue's sentinel head and its length counter
pub fn subqueue(
    target: &Target<'_>,
    fifo: Address<kind::QueueFifo>,
    which: Subqueue,
) -> Result<(Address<kind::QueueNode>, usize)> {
    let layout = &target.layout().queue_fifo;
    let (head, len) = match which {
        Subqueue::Wait => (layout.qoverflow_wait, layout.qoverflow_wait_len),
        Subqueue::Output => (layout.qoverflow_output, layout.qoverflow_output_len),
    };

    let length = target.read_u32(fifo, len)? as usize;
    Ok((fifo.field(head).cast(), length))
}

/// Decode `field` of the first `length` messages linked from `head`
///
/// The walk follows `next` from the sentinel and reads each node's message.
/// It takes exactly `length` steps whatever the chain looks like, and any
/// failure (read error, cancellation, implausible length) discards the
/// partial result.
pub fn drain(
    target: &Target<'_>,
    head: Address<kind::QueueNode>,
    length: usize,
    field: StaticField,
    cancel: &Cancellation,
) -> Result<Vec<FieldValue>> {
    let node_layout = &target.layout().queue_node;
    let limit = target.limits().max_queue_length;

    bounded_walk(head, length, limit, cancel, |&cursor| {
        let node: Address<kind::QueueNode> =
            target.read_non_null(cursor, node_layout.next, "queue node")?;
        let message: Address<kind::LogMessage> =
            target.read_non_null(node, node_layout.msg, "queued message")?;

        let value = decode_message_field(target, message, field)?;
        tracing::debug!(node = %node, message = %message, "decoded queued message");

        Ok((node, value))
    })
}

/// Decode every buffered message of a fifo queue, wait subqueue first
pub fn dump_queue(
    target: &Target<'_>,
    queue: Address<kind::LogQueue>,
    field: StaticField,
    cancel: &Cancellation,
) -> Result<Vec<FieldValue>> {
    let fifo: Address<kind::QueueFifo> = queue.cast();
    let mut messages = Vec::new();

    for which in Subqueue::ALL {
        let (head, length) = subqueue(target, fifo, which)?;
        tracing::debug!(queue = %queue, subqueue = which.name(), length, "draining");
        messages.extend(drain(target, head, length, field, cancel)?);
    }

    Ok(messages)
}
