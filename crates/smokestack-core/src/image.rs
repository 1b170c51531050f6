use std::fmt;

/// A container image reference such as `site:abc1234` or
/// `us-docker.pkg.dev/project/repo/site@sha256:...`.
///
/// Parsing only splits the reference into its parts; the original string is
/// kept and handed to the container engine unchanged.
///
/// # Examples
///
/// ```
/// use smokestack_core::ImageRef;
///
/// let image = ImageRef::parse("localhost:5000/site:abc1234").unwrap();
/// assert_eq!(image.registry(), Some("localhost:5000"));
/// assert_eq!(image.repository(), "site");
/// assert_eq!(image.tag(), Some("abc1234"));
/// assert_eq!(image.to_string(), "localhost:5000/site:abc1234");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    reference: String,
    registry: Option<String>,
    repository: String,
    tag: Option<String>,
    digest: Option<String>,
}

impl ImageRef {
    pub fn parse(reference: &str) -> crate::Result<Self> {
        let invalid = |reason| crate::Error::InvalidImageRef {
            reference: reference.to_owned(),
            reason,
        };

        if reference.trim().is_empty() {
            return Err(invalid("must not be empty"));
        }
        if reference.chars().any(char::is_whitespace) {
            return Err(invalid("must not contain whitespace"));
        }

        let (name, digest) = match reference.split_once('@') {
            Some((_, "")) => return Err(invalid("empty digest after '@'")),
            Some((name, digest)) => (name, Some(digest.to_owned())),
            None => (reference, None),
        };

        // A ':' before the last '/' belongs to a registry port, not a tag.
        let last_slash = name.rfind('/').map_or(0, |i| i + 1);
        let (name, tag) = match name[last_slash..].rfind(':') {
            Some(i) => {
                let split = last_slash + i;
                let tag = &name[split + 1..];
                if tag.is_empty() {
                    return Err(invalid("empty tag after ':'"));
                }
                (&name[..split], Some(tag.to_owned()))
            }
            None => (name, None),
        };

        let (registry, repository) = match name.split_once('/') {
            Some((first, rest)) if is_registry_host(first) => (Some(first.to_owned()), rest),
            _ => (None, name),
        };

        if repository.is_empty() || repository.split('/').any(str::is_empty) {
            return Err(invalid("missing repository name"));
        }

        Ok(Self {
            reference: reference.to_owned(),
            registry,
            repository: repository.to_owned(),
            tag,
            digest,
        })
    }

    pub fn registry(&self) -> Option<&str> {
        self.registry.as_deref()
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn digest(&self) -> Option<&str> {
        self.digest.as_deref()
    }

    pub fn as_str(&self) -> &str {
        &self.reference
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reference)
    }
}

impl std::str::FromStr for ImageRef {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        Self::parse(s)
    }
}

fn is_registry_host(segment: &str) -> bool {
    segment == "localhost" || segment.contains('.') || segment.contains(':')
}
