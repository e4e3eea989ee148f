//! Single-day window over a timestamp-descending record stream

use super::record::Record;
use chrono::NaiveDate;

/// Lazily yields the records whose date equals `day`.
///
/// The source must be sorted by timestamp descending. Records newer than the
/// day are skipped; the first record older than the day ends the window and
/// nothing after it is pulled from the source. Unsorted input is not re-sorted.
///
/// Errors from the source are passed through unchanged so the consumer can
/// decide whether to abort.
pub struct DayWindow<I> {
    source: I,
    day: NaiveDate,
    done: bool,
}

impl<I> DayWindow<I> {
    pub fn new(source: I, day: NaiveDate) -> Self {
        Self {
            source,
            day,
            done: false,
        }
    }
}

impl<I, E> Iterator for DayWindow<I>
where
    I: Iterator<Item = Result<Record, E>>,
{
    type Item = Result<Record, E>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            let record = match self.source.next()? {
                Ok(record) => record,
                Err(e) => return Some(Err(e)),
            };

            let date = record.date();
            if date > self.day {
                continue;
            }
            if date < self.day {
                self.done = true;
                return None;
            }
            return Some(Ok(record));
        }
    }
}

pub trait WithinDay: Sized {
    fn within_day(self, day: NaiveDate) -> DayWindow<Self>;
}

impl<I, E> WithinDay for I
where
    I: Iterator<Item = Result<Record, E>>,
{
    fn within_day(self, day: NaiveDate) -> DayWindow<Self> {
        DayWindow::new(self, day)
    }
}
