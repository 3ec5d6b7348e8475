use crate::config::FeatureConfig;
use crate::document::{Document, DocumentRole, FeatureDocument};
use crate::error::CanonicalError;
use crate::normalize::normalize;
use crate::shingle::{title_shingles, ShingleSet};

/// Main entry point. Takes a raw document and config and returns its feature
/// blob and shingle set.
///
/// Feature order is fixed: title shingles, directors, capped cast, release
/// year, duration, language. Each field is normalized on its own before the
/// outer join.
pub fn extract_features(
    doc: &Document,
    role: DocumentRole,
    cfg: &FeatureConfig,
) -> Result<FeatureDocument, CanonicalError> {
    cfg.validate()?;

    if doc.id.trim().is_empty() {
        return Err(CanonicalError::MissingDocId);
    }
    if doc.title.is_empty() {
        return Err(CanonicalError::MissingTitle { id: doc.id.clone() });
    }

    let fields = feature_fields(doc, role, cfg);

    let mut blob = String::with_capacity(fields.iter().map(String::len).sum::<usize>() + 8);
    for (idx, field) in fields.iter().enumerate() {
        if idx > 0 {
            blob.push(cfg.outer_separator);
        }
        blob.push_str(&normalize(field));
    }

    let shingles = ShingleSet::from_blob(&blob, cfg.outer_separator, cfg.inner_separator);

    Ok(FeatureDocument {
        id: doc.id.clone(),
        title: doc.title.clone(),
        blob,
        shingles,
    })
}

/// Un-normalized feature fields, each with its tokens joined by the inner
/// separator.
fn feature_fields(doc: &Document, role: DocumentRole, cfg: &FeatureConfig) -> [String; 6] {
    let inner = cfg.inner_separator;

    let title = join(title_shingles(&doc.title, cfg.title_shingle_size), inner);
    let directors = join(doc.directors.split(','), inner);
    let cast = join(doc.cast.split(',').take(cfg.cast_limit), inner);

    let language = if role == DocumentRole::Query && doc.language.is_empty() {
        cfg.default_query_language.clone()
    } else {
        doc.language.clone()
    };

    [
        title,
        directors,
        cast,
        doc.release_year.clone(),
        doc.duration.clone(),
        language,
    ]
}

fn join<I, S>(parts: I, sep: char) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for (idx, part) in parts.into_iter().enumerate() {
        if idx > 0 {
            out.push(sep);
        }
        out.push_str(part.as_ref());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heat() -> Document {
        Document::new("m-1", "Heat")
            .with_directors("Michael Mann")
            .with_cast("Al Pacino, Robert De Niro, Val Kilmer")
            .with_release_year("1995")
            .with_duration("170")
            .with_language("English")
    }

    #[test]
    fn blob_layout() {
        let doc = extract_features(&heat(), DocumentRole::Corpus, &FeatureConfig::default())
            .expect("features");
        assert_eq!(
            doc.blob,
            "HE EA AT|MICHAEL MANN|AL PACINO  ROBERT DE NIRO|1995|170|ENGLISH"
        );
    }

    #[test]
    fn cast_is_capped_but_directors_are_not() {
        let doc = heat().with_directors("A, B, C");
        let fields = feature_fields(&doc, DocumentRole::Corpus, &FeatureConfig::default());
        assert_eq!(fields[1], "A  B  C");
        assert_eq!(fields[2], "Al Pacino  Robert De Niro");
    }

    #[test]
    fn shingles_recovered_from_blob() {
        let doc = extract_features(&heat(), DocumentRole::Corpus, &FeatureConfig::default())
            .expect("features");
        for token in ["HE", "EA", "AT", "MICHAEL", "PACINO", "NIRO", "1995", "170", "ENGLISH"] {
            assert!(doc.shingles.contains(token.as_bytes()), "missing {token}");
        }
        assert!(!doc.shingles.contains(b"KILMER"));
        assert!(!doc.shingles.contains(b""));
    }

    #[test]
    fn query_language_defaults_to_english() {
        let doc = Document::new("q-1", "Heat");
        let query = extract_features(&doc, DocumentRole::Query, &FeatureConfig::default())
            .expect("features");
        assert!(query.blob.ends_with("|ENGLISH"));

        let corpus = extract_features(&doc, DocumentRole::Corpus, &FeatureConfig::default())
            .expect("features");
        assert!(corpus.blob.ends_with('|'));
    }

    #[test]
    fn absent_fields_are_empty_not_errors() {
        let doc = Document::new("q-2", "Up");
        let features = extract_features(&doc, DocumentRole::Query, &FeatureConfig::default())
            .expect("features");
        assert_eq!(features.blob, "UP|||||ENGLISH");
        assert_eq!(features.shingles.len(), 2);
    }

    #[test]
    fn case_differences_disappear() {
        let cfg = FeatureConfig::default();
        let upper = Document {
            id: "a".into(),
            title: "HEAT".into(),
            ..heat()
        };
        let lower = Document {
            id: "b".into(),
            title: "heat".into(),
            cast: "al pacino, robert de niro".into(),
            ..heat()
        };
        let a = extract_features(&upper, DocumentRole::Corpus, &cfg).expect("a");
        let b = extract_features(&lower, DocumentRole::Corpus, &cfg).expect("b");
        assert_eq!(a.blob, b.blob);
        assert_eq!(a.shingles, b.shingles);
    }

    #[test]
    fn empty_title_rejected() {
        let doc = Document::new("m-9", "");
        let res = extract_features(&doc, DocumentRole::Corpus, &FeatureConfig::default());
        assert_eq!(
            res,
            Err(CanonicalError::MissingTitle {
                id: "m-9".to_string()
            })
        );
    }

    #[test]
    fn blank_id_rejected() {
        let doc = Document::new("  ", "Heat");
        let res = extract_features(&doc, DocumentRole::Query, &FeatureConfig::default());
        assert_eq!(res, Err(CanonicalError::MissingDocId));
    }

    #[test]
    fn invalid_config_rejected() {
        let cfg = FeatureConfig::default().with_title_shingle_size(0);
        let res = extract_features(&heat(), DocumentRole::Corpus, &cfg);
        assert!(matches!(res, Err(CanonicalError::InvalidConfig(_))));
    }

    #[test]
    fn single_character_title_yields_one_shingle() {
        let doc = Document::new("m-3", "M");
        let features = extract_features(&doc, DocumentRole::Corpus, &FeatureConfig::default())
            .expect("features");
        assert_eq!(features.blob, "M |||||");
        assert!(features.shingles.contains(b"M"));
    }
}
