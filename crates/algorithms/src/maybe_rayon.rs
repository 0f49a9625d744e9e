/// Parallel iteration shim.
///
/// With the `parallel` feature, rayon's prelude is re-exported and
/// `into_par_iter()` fans work out across threads. Without it the same
/// call resolves to a plain sequential iterator, so KNN search and
/// permutation trials compile unchanged on single-threaded targets.
/// Both paths collect in index order.
#[cfg(feature = "parallel")]
pub use rayon::prelude::*;

#[cfg(not(feature = "parallel"))]
mod sequential {
    /// Sequential stand-in for `rayon::prelude::IntoParallelIterator`.
    pub trait IntoParallelIterator {
        type Iter;
        type Item;
        fn into_par_iter(self) -> Self::Iter;
    }

    impl<I: IntoIterator> IntoParallelIterator for I {
        type Iter = I::IntoIter;
        type Item = I::Item;
        fn into_par_iter(self) -> Self::Iter {
            self.into_iter()
        }
    }
}

#[cfg(not(feature = "parallel"))]
pub use sequential::*;
