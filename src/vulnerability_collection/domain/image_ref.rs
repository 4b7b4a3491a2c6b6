use serde::{Deserialize, Serialize};

/// NewType wrapper for a container image reference (e.g. `nginx:1.25`)
///
/// The value is opaque: two references are the same image only when the
/// strings match exactly. No registry or tag normalization is performed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true when the reference carries no usable characters
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Display for ImageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ImageRef {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ImageRef {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_ref_equality_is_exact() {
        assert_eq!(ImageRef::new("nginx:1.25"), ImageRef::from("nginx:1.25"));
        assert_ne!(ImageRef::new("nginx:1.25"), ImageRef::new("docker.io/nginx:1.25"));
        assert_ne!(ImageRef::new("nginx"), ImageRef::new("nginx:latest"));
    }

    #[test]
    fn test_image_ref_display() {
        let image = ImageRef::new("alpine:3.19");
        assert_eq!(format!("{}", image), "alpine:3.19");
        assert_eq!(image.as_str(), "alpine:3.19");
    }

    #[test]
    fn test_image_ref_is_blank() {
        assert!(ImageRef::new("").is_blank());
        assert!(ImageRef::new("   ").is_blank());
        assert!(!ImageRef::new("redis").is_blank());
    }

    #[test]
    fn test_image_ref_serde_is_transparent() {
        let image: ImageRef = serde_json::from_str("\"busybox\"").unwrap();
        assert_eq!(image.as_str(), "busybox");
        assert_eq!(serde_json::to_string(&image).unwrap(), "\"busybox\"");
    }
}
