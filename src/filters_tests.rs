// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `filters.rs`

#[cfg(test)]
mod tests {
    use crate::constants::FILTER_ANNOTATION;
    use crate::errors::AutoTriggerError;
    use crate::filters::{parse_filters, FilterSchema, FilterSpec};
    use std::collections::BTreeMap;

    fn annotated(value: &str) -> BTreeMap<String, String> {
        BTreeMap::from([(FILTER_ANNOTATION.to_string(), value.to_string())])
    }

    fn default_attributes() -> FilterSpec {
        FilterSpec::Attributes {
            broker: "default".into(),
            attributes: BTreeMap::new(),
        }
    }

    #[test]
    fn test_absent_annotation_yields_no_filters() {
        let mut annotations = BTreeMap::new();
        annotations.insert("unrelated".to_string(), "[]".to_string());

        let filters = parse_filters(&annotations, FilterSchema::Attributes).unwrap();

        assert!(filters.is_empty());
    }

    #[test]
    fn test_empty_forms_yield_one_default_filter() {
        for value in ["", "[]", "[{}]"] {
            let filters = parse_filters(&annotated(value), FilterSchema::Attributes).unwrap();
            assert_eq!(
                filters,
                vec![default_attributes()],
                "value {value:?} should yield one default filter"
            );
        }
    }

    #[test]
    fn test_empty_forms_under_source_and_type_match_anything() {
        let filters = parse_filters(&annotated("[{}]"), FilterSchema::SourceAndType).unwrap();

        assert_eq!(
            filters,
            vec![FilterSpec::SourceAndType {
                broker: "default".into(),
                event_type: String::new(),
                source: String::new(),
            }]
        );
    }

    #[test]
    fn test_malformed_annotation_is_an_error() {
        let err = parse_filters(&annotated("not json"), FilterSchema::Attributes).unwrap_err();
        assert!(matches!(err, AutoTriggerError::AnnotationParse { .. }));
    }

    #[test]
    fn test_non_string_values_are_rejected() {
        let err = parse_filters(&annotated(r#"[{"broker": 1}]"#), FilterSchema::Attributes)
            .unwrap_err();
        assert!(matches!(err, AutoTriggerError::AnnotationParse { .. }));
    }

    #[test]
    fn test_object_instead_of_array_is_rejected() {
        let result = parse_filters(&annotated(r#"{"broker": "b2"}"#), FilterSchema::Attributes);
        assert!(result.is_err());
    }

    #[test]
    fn test_null_yields_no_filters() {
        let filters = parse_filters(&annotated("null"), FilterSchema::Attributes).unwrap();
        assert!(filters.is_empty());
    }

    #[test]
    fn test_attribute_schema_splits_broker_from_attributes() {
        let filters = parse_filters(
            &annotated(r#"[{"type":"foo","source":"bar"},{"broker":"b2"}]"#),
            FilterSchema::Attributes,
        )
        .unwrap();

        assert_eq!(
            filters,
            vec![
                FilterSpec::Attributes {
                    broker: "default".into(),
                    attributes: BTreeMap::from([
                        ("source".to_string(), "bar".to_string()),
                        ("type".to_string(), "foo".to_string()),
                    ]),
                },
                FilterSpec::Attributes {
                    broker: "b2".into(),
                    attributes: BTreeMap::new(),
                },
            ]
        );
    }

    #[test]
    fn test_source_and_type_schema_ignores_extra_keys() {
        let filters = parse_filters(
            &annotated(r#"[{"type":"foo","source":"bar","subject":"x","broker":"b3"}]"#),
            FilterSchema::SourceAndType,
        )
        .unwrap();

        assert_eq!(
            filters,
            vec![FilterSpec::SourceAndType {
                broker: "b3".into(),
                event_type: "foo".into(),
                source: "bar".into(),
            }]
        );
    }

    #[test]
    fn test_trigger_filter_translation() {
        let attributes = FilterSpec::Attributes {
            broker: "default".into(),
            attributes: BTreeMap::from([("type".to_string(), "foo".to_string())]),
        };
        let filter = attributes.trigger_filter();
        assert!(filter.source_and_type.is_none());
        assert_eq!(filter.attributes.unwrap().get("type").unwrap(), "foo");

        let legacy = FilterSpec::SourceAndType {
            broker: "b2".into(),
            event_type: "foo".into(),
            source: "bar".into(),
        };
        let filter = legacy.trigger_filter();
        assert!(filter.attributes.is_none());
        let source_and_type = filter.source_and_type.unwrap();
        assert_eq!(source_and_type.event_type, "foo");
        assert_eq!(source_and_type.source, "bar");
        assert_eq!(legacy.broker(), "b2");
    }

    #[test]
    fn test_filter_schema_from_str() {
        assert_eq!(
            "attributes".parse::<FilterSchema>().unwrap(),
            FilterSchema::Attributes
        );
        assert_eq!(
            "Source-And-Type".parse::<FilterSchema>().unwrap(),
            FilterSchema::SourceAndType
        );
        assert!("bogus".parse::<FilterSchema>().is_err());
        assert_eq!(FilterSchema::SourceAndType.to_string(), "source-and-type");
    }
}
