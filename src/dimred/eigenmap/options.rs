use crate::EigenmapError;
use std::collections::BTreeMap;
use std::str::FromStr;

pub const PROPERTY_K: &str = "laplacian_eigenmap.k";
pub const PROPERTY_D: &str = "laplacian_eigenmap.d";
pub const PROPERTY_T: &str = "laplacian_eigenmap.t";

/// Laplacian Eigenmap hyper-parameters.
///
/// - `k`: number of nearest neighbors joined to each point (at least 2)
/// - `d`: dimension of the embedding (at least 2)
/// - `t`: width of the heat kernel `exp(-||x - y||^2 / t)`; a non-positive value
///   selects discrete 0/1 edge weights
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Options {
    k: usize,
    d: usize,
    t: f64,
}

impl Options {
    pub fn new(k: usize, d: usize, t: f64) -> anyhow::Result<Self> {
        if k < 2 {
            return Err(EigenmapError::InvalidNeighbors(k).into());
        }
        if d < 2 {
            return Err(EigenmapError::InvalidDimension(d).into());
        }
        Ok(Options { k, d, t })
    }

    /// `k` neighbors, a 2-dimensional embedding and discrete weights.
    pub fn with_neighbors(k: usize) -> anyhow::Result<Self> {
        Self::new(k, 2, -1.0)
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn d(&self) -> usize {
        self.d
    }

    pub fn t(&self) -> f64 {
        self.t
    }

    pub fn discrete_weights(&self) -> bool {
        self.t <= 0.0
    }

    pub fn to_properties(&self) -> BTreeMap<String, String> {
        let mut props = BTreeMap::new();
        props.insert(PROPERTY_K.to_string(), self.k.to_string());
        props.insert(PROPERTY_D.to_string(), self.d.to_string());
        props.insert(PROPERTY_T.to_string(), self.t.to_string());
        props
    }

    /// Reads options written by [`Options::to_properties`]; missing keys take the defaults.
    pub fn from_properties(props: &BTreeMap<String, String>) -> anyhow::Result<Self> {
        let defaults = Options::default();
        let k = parse_property(props, PROPERTY_K, defaults.k)?;
        let d = parse_property(props, PROPERTY_D, defaults.d)?;
        let t = parse_property(props, PROPERTY_T, defaults.t)?;
        Self::new(k, d, t)
    }
}

impl Default for Options {
    fn default() -> Self {
        Options {
            k: 7,
            d: 2,
            t: -1.0,
        }
    }
}

fn parse_property<V: FromStr>(
    props: &BTreeMap<String, String>,
    key: &str,
    default: V,
) -> anyhow::Result<V> {
    match props.get(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<V>().map_err(|_| {
            anyhow::Error::from(EigenmapError::InvalidProperty {
                key: key.to_string(),
                value: raw.clone(),
            })
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation() {
        let err = Options::new(1, 2, -1.0).unwrap_err();
        assert_eq!(
            err.downcast_ref::<EigenmapError>(),
            Some(&EigenmapError::InvalidNeighbors(1))
        );

        let err = Options::new(5, 1, -1.0).unwrap_err();
        assert_eq!(
            err.downcast_ref::<EigenmapError>(),
            Some(&EigenmapError::InvalidDimension(1))
        );

        let options = Options::new(2, 2, 0.5).unwrap();
        assert_eq!((options.k(), options.d(), options.t()), (2, 2, 0.5));
        assert!(!options.discrete_weights());
    }

    #[test]
    fn test_with_neighbors() {
        let options = Options::with_neighbors(12).unwrap();
        assert_eq!(options.k(), 12);
        assert_eq!(options.d(), 2);
        assert!(options.discrete_weights());
        assert!(Options::with_neighbors(0).is_err());
    }

    #[test]
    fn test_properties_round_trip() {
        let options = Options::new(10, 3, 2.5).unwrap();
        let props = options.to_properties();
        assert_eq!(props.get(PROPERTY_K).map(String::as_str), Some("10"));
        assert_eq!(props.get(PROPERTY_T).map(String::as_str), Some("2.5"));
        assert_eq!(Options::from_properties(&props).unwrap(), options);
    }

    #[test]
    fn test_properties_defaults() {
        let options = Options::from_properties(&BTreeMap::new()).unwrap();
        assert_eq!(options, Options::default());
        assert_eq!(options.k(), 7);
    }

    #[test]
    fn test_properties_invalid_values() {
        let mut props = BTreeMap::new();
        props.insert(PROPERTY_D.to_string(), "two".to_string());
        let err = Options::from_properties(&props).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EigenmapError>(),
            Some(EigenmapError::InvalidProperty { .. })
        ));

        props.insert(PROPERTY_D.to_string(), "1".to_string());
        assert!(Options::from_properties(&props).is_err());
    }
}
