/// Groups the items of an iterator into batches of a fixed size. The last batch holds the
/// remainder and may be smaller.
pub trait Batching: Iterator + Sized {
    fn batches(self, size: usize) -> Batches<Self>;
}

impl<I: Iterator> Batching for I {
    fn batches(self, size: usize) -> Batches<Self> {
        assert!(size > 0, "batch size must be positive");
        Batches { iter: self, size }
    }
}

#[derive(Debug)]
pub struct Batches<I> {
    iter: I,
    size: usize,
}

impl<I: Iterator> Iterator for Batches<I> {
    type Item = Vec<I::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        let batch = self.iter.by_ref().take(self.size).collect::<Vec<_>>();
        if batch.is_empty() { None } else { Some(batch) }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (lower, upper) = self.iter.size_hint();
        (lower.div_ceil(self.size), upper.map(|upper| upper.div_ceil(self.size)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(2500, vec![1000, 1000, 500])]
    #[case(1000, vec![1000])]
    #[case(1001, vec![1000, 1])]
    #[case(0, vec![])]
    fn batches_by_count(#[case] items: usize, #[case] expected: Vec<usize>) {
        let sizes = (0..items).batches(1000).map(|batch| batch.len()).collect::<Vec<_>>();

        assert_eq!(sizes, expected);
    }

    #[test]
    fn keeps_the_generation_order() {
        let batches = (0..5).batches(2).collect::<Vec<_>>();

        assert_eq!(batches, vec![vec![0, 1], vec![2, 3], vec![4]]);
    }

    #[test]
    fn size_hint_counts_the_partial_batch() {
        assert_eq!((0..2500).batches(1000).size_hint(), (3, Some(3)));
    }

    #[test]
    #[should_panic]
    fn rejects_a_zero_batch_size() {
        let _ = (0..1).batches(0);
    }
}
