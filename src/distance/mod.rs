use ndarray::ArrayView1;
use num_traits::Float;

/// A distance measure between two points of type `T`.
///
/// Anything that can compare two points works, including plain closures:
///
/// ```ignore
/// let hamming = |a: &String, b: &String| a.chars().zip(b.chars()).filter(|(x, y)| x != y).count() as f64;
/// ```
pub trait Distance<T: ?Sized> {
    fn distance(&self, a: &T, b: &T) -> f64;
}

impl<T: ?Sized, F> Distance<T> for F
where
    F: Fn(&T, &T) -> f64,
{
    fn distance(&self, a: &T, b: &T) -> f64 {
        self(a, b)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Euclidean;

#[derive(Debug, Clone, Copy, Default)]
pub struct Manhattan;

#[derive(Debug, Clone, Copy, Default)]
pub struct Chebyshev;

/// `1 - cos(a, b)`. Zero vectors are at distance 1 from everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cosine;

fn to_f64<T: Float>(value: T) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}

fn euclidean<'a, T, I>(a: I, b: I) -> f64
where
    T: Float + 'a,
    I: Iterator<Item = &'a T>,
{
    let mut squared_dist = T::zero();
    for (&x, &y) in a.zip(b) {
        let diff = x - y;
        squared_dist = squared_dist + diff * diff;
    }
    to_f64(squared_dist.sqrt())
}

fn manhattan<'a, T, I>(a: I, b: I) -> f64
where
    T: Float + 'a,
    I: Iterator<Item = &'a T>,
{
    let mut dist = T::zero();
    for (&x, &y) in a.zip(b) {
        dist = dist + (x - y).abs();
    }
    to_f64(dist)
}

fn chebyshev<'a, T, I>(a: I, b: I) -> f64
where
    T: Float + 'a,
    I: Iterator<Item = &'a T>,
{
    a.zip(b)
        .map(|(&x, &y)| (x - y).abs())
        .fold(T::zero(), |acc, d| acc.max(d))
        .to_f64()
        .unwrap_or(f64::NAN)
}

fn cosine<'a, T, I>(a: I, b: I) -> f64
where
    T: Float + 'a,
    I: Iterator<Item = &'a T>,
{
    let mut dot_product = T::zero();
    let mut norm_a = T::zero();
    let mut norm_b = T::zero();

    for (&x, &y) in a.zip(b) {
        dot_product = dot_product + x * y;
        norm_a = norm_a + x * x;
        norm_b = norm_b + y * y;
    }

    let norm_product = (norm_a * norm_b).sqrt();
    if norm_product > T::epsilon() {
        1.0 - to_f64(dot_product / norm_product)
    } else {
        1.0
    }
}

macro_rules! impl_vector_distance {
    ($measure:ty, $kernel:ident) => {
        impl<T: Float> Distance<[T]> for $measure {
            fn distance(&self, a: &[T], b: &[T]) -> f64 {
                $kernel(a.iter(), b.iter())
            }
        }

        impl<T: Float> Distance<Vec<T>> for $measure {
            fn distance(&self, a: &Vec<T>, b: &Vec<T>) -> f64 {
                $kernel(a.iter(), b.iter())
            }
        }

        impl<T: Float, const N: usize> Distance<[T; N]> for $measure {
            fn distance(&self, a: &[T; N], b: &[T; N]) -> f64 {
                $kernel(a.iter(), b.iter())
            }
        }

        impl<'v, T: Float> Distance<ArrayView1<'v, T>> for $measure {
            fn distance(&self, a: &ArrayView1<'v, T>, b: &ArrayView1<'v, T>) -> f64 {
                $kernel(a.iter(), b.iter())
            }
        }
    };
}

impl_vector_distance!(Euclidean, euclidean);
impl_vector_distance!(Manhattan, manhattan);
impl_vector_distance!(Chebyshev, chebyshev);
impl_vector_distance!(Cosine, cosine);
