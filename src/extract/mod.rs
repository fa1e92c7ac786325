//! Extractors: one job per entity kind per side. Each streams
//! rows from the source dictionary, builds entities, and inserts them into
//! the Catalog in a fixed population order.

pub mod oracle_side;
pub mod postgres_side;

use crate::error::Result;

/// Incremental progress callback: `(done, total)`, `total` is `None` when
/// the row count isn't known up front.
pub type ProgressFn<'a> = dyn FnMut(u64, Option<u64>) + Send + 'a;

/// Common shape of an extraction job: run it, reporting progress, and
/// return how many entities were inserted.
pub trait Extractor {
    fn kind(&self) -> &'static str;
}

pub(crate) fn report(progress: &mut ProgressFn<'_>, done: u64, total: Option<u64>) {
    progress(done, total);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_invokes_the_callback_with_given_counts() {
        let mut seen = Vec::new();
        {
            let mut progress: Box<ProgressFn> = Box::new(|done, total| seen.push((done, total)));
            report(&mut *progress, 3, Some(10));
        }
        assert_eq!(seen, vec![(3, Some(10))]);
    }
}
