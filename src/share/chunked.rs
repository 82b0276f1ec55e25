//! Chunked, bounded-concurrency writes.
//!
//! The upload body arrives as a stream of arbitrarily sized pieces. [`write_chunked`]
//! regroups it into fixed-size chunks at fixed offsets and hands every chunk to a write
//! callback, keeping at most `max_concurrency` writes in flight.

use std::future::Future;

use bytes::{Bytes, BytesMut};
use futures::stream::{FuturesUnordered, StreamExt};

use super::gateway::ByteStream;
use crate::{Result, SharefrontError};

/// A chunk of the body together with its offset in the target file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Byte offset of the chunk in the file.
    pub offset: u64,
    /// Chunk content.
    pub data: Bytes,
}

/// Drive `write` over `body` in `chunk_size` pieces.
///
/// Every chunk except the last is exactly `chunk_size` bytes. Reading stops with
/// `SizeMismatch` as soon as the body exceeds `size`, or at the end if it falls short.
/// The first failing write aborts the transfer; chunks still in flight are dropped.
pub async fn write_chunked<F, Fut>(
    mut body: ByteStream,
    size: u64,
    chunk_size: usize,
    max_concurrency: usize,
    write: F,
) -> Result<()>
where
    F: Fn(Chunk) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    if chunk_size == 0 || max_concurrency == 0 {
        return Err(SharefrontError::Validation(
            "chunk size and concurrency must be greater than 0".to_string(),
        ));
    }

    let mut in_flight = FuturesUnordered::new();
    let mut buffer = BytesMut::with_capacity(chunk_size);
    let mut next_offset: u64 = 0;
    let mut received: u64 = 0;

    while let Some(piece) = body.next().await {
        let mut piece = piece?;
        received += piece.len() as u64;
        if received > size {
            return Err(SharefrontError::SizeMismatch {
                declared: size,
                actual: received,
            });
        }

        while !piece.is_empty() {
            let take = (chunk_size - buffer.len()).min(piece.len());
            buffer.extend_from_slice(&piece.split_to(take));

            if buffer.len() == chunk_size {
                let data = buffer.split().freeze();
                let chunk = Chunk {
                    offset: next_offset,
                    data,
                };
                next_offset += chunk_size as u64;

                if in_flight.len() >= max_concurrency {
                    if let Some(done) = in_flight.next().await {
                        done?;
                    }
                }
                in_flight.push(write(chunk));
            }
        }
    }

    if received != size {
        return Err(SharefrontError::SizeMismatch {
            declared: size,
            actual: received,
        });
    }

    if !buffer.is_empty() {
        in_flight.push(write(Chunk {
            offset: next_offset,
            data: buffer.freeze(),
        }));
    }

    while let Some(done) = in_flight.next().await {
        done?;
    }

    Ok(())
}
