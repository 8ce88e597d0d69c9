use crate::{AnnotationError, Result};
use std::fmt;

/// Separator between the three parts of an encoded identity.
///
/// Filenames, segment labels and field names are assumed never to contain it.
/// Nothing is escaped; components that do contain it are rejected instead.
pub const KEY_DELIMITER: &str = "<>";

/// Identity of one annotation: (file, segment label, field name).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AnnotationKey {
    file: String,
    segment: String,
    field: String,
}

impl AnnotationKey {
    pub fn new(
        file: impl Into<String>,
        segment: impl Into<String>,
        field: impl Into<String>,
    ) -> Result<Self> {
        let key = Self {
            file: file.into(),
            segment: segment.into(),
            field: field.into(),
        };
        check_component("file", &key.file)?;
        check_component("segment", &key.segment)?;
        check_component("field", &key.field)?;
        Ok(key)
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn segment(&self) -> &str {
        &self.segment
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    /// `file<>segment<>field`
    pub fn compose(&self) -> String {
        compose(&self.file, &self.segment, &self.field)
    }

    /// Inverse of [`AnnotationKey::compose`]. Anything that does not split into
    /// exactly three non-empty parts is rejected rather than guessed at.
    pub fn decompose(encoded: &str) -> Result<Self> {
        let parts: Vec<&str> = encoded.split(KEY_DELIMITER).collect();
        let [file, segment, field] = parts[..] else {
            return Err(AnnotationError::MalformedKey {
                key: encoded.to_string(),
                parts: parts.len(),
            });
        };
        Self::new(file, segment, field)
    }
}

impl fmt::Display for AnnotationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{KEY_DELIMITER}{}{KEY_DELIMITER}{}",
            self.file, self.segment, self.field
        )
    }
}

/// Encode an identity without validating it; used when rendering control names.
pub fn compose(file: &str, segment: &str, field: &str) -> String {
    format!("{file}{KEY_DELIMITER}{segment}{KEY_DELIMITER}{field}")
}

/// Reject empty components and components containing [`KEY_DELIMITER`].
pub fn check_component(component: &'static str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(AnnotationError::EmptyComponent { component });
    }
    if value.contains(KEY_DELIMITER) {
        return Err(AnnotationError::ReservedDelimiter {
            component,
            value: value.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn compose_decompose_round_trip() {
        let cases = [
            ("file.go", "func main() {", "Checked"),
            ("sub/dir/x.go", "func (s *Server) Run(ctx context.Context) error {", "Notes"),
            ("a", "b", "c"),
            ("ünï.go", "  indented <tag> {", "Reviewed by"),
        ];
        for (file, segment, field) in cases {
            let key = AnnotationKey::new(file, segment, field).unwrap();
            let decoded = AnnotationKey::decompose(&key.compose()).unwrap();
            assert_eq!(decoded, key);
            assert_eq!(
                (decoded.file(), decoded.segment(), decoded.field()),
                (file, segment, field)
            );
        }
    }

    #[test]
    fn display_matches_compose() {
        let key = AnnotationKey::new("file.go", "main", "checked").unwrap();
        assert_eq!(key.to_string(), "file.go<>main<>checked");
        assert_eq!(key.to_string(), key.compose());
    }

    #[test]
    fn wrong_part_count_is_malformed() {
        for (encoded, parts) in [
            ("invalid-format", 1),
            ("file.go<>main", 2),
            ("file.go<>main<>checked<>extra", 4),
        ] {
            match AnnotationKey::decompose(encoded) {
                Err(AnnotationError::MalformedKey { key, parts: found }) => {
                    assert_eq!(key, encoded);
                    assert_eq!(found, parts);
                }
                other => panic!("expected MalformedKey for {encoded}, got {other:?}"),
            }
        }
    }

    #[test]
    fn empty_components_are_rejected() {
        assert!(matches!(
            AnnotationKey::decompose("<>main<>checked"),
            Err(AnnotationError::EmptyComponent { component: "file" })
        ));
        assert!(matches!(
            AnnotationKey::new("file.go", "", "checked"),
            Err(AnnotationError::EmptyComponent { component: "segment" })
        ));
        assert!(matches!(
            AnnotationKey::new("file.go", "main", ""),
            Err(AnnotationError::EmptyComponent { component: "field" })
        ));
    }

    #[test]
    fn delimiter_inside_component_is_rejected() {
        assert!(matches!(
            AnnotationKey::new("file.go", "if a <> b {", "checked"),
            Err(AnnotationError::ReservedDelimiter {
                component: "segment",
                ..
            })
        ));
    }
}
