// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `trigger_resources.rs`

#[cfg(test)]
mod tests {
    use crate::addressable::Addressable;
    use crate::constants::{FILTER_ANNOTATION, MAX_GENERATE_NAME_PREFIX_LEN};
    use crate::errors::AutoTriggerError;
    use crate::filters::FilterSchema;
    use crate::labels::{
        AUTOTRIGGER_PARENT_KIND_LABEL, AUTOTRIGGER_PARENT_NAME_LABEL, K8S_MANAGED_BY,
    };
    use crate::trigger_resources::{
        make_labels, make_owner_reference, make_subscriber, make_triggers, trigger_name_prefix,
    };
    use std::collections::BTreeMap;

    fn parent_with(annotation: Option<&str>) -> Addressable {
        let mut annotations = BTreeMap::new();
        if let Some(value) = annotation {
            annotations.insert(FILTER_ANNOTATION.to_string(), value.to_string());
        }
        Addressable {
            namespace: "default".into(),
            name: "event-display".into(),
            kind: "Service".into(),
            api_version: "serving.knative.dev/v1".into(),
            uid: "uid-1".into(),
            annotations,
            deletion_timestamp: None,
        }
    }

    #[test]
    fn test_labels_depend_only_on_identity() {
        let a = parent_with(Some("[]"));
        let mut b = parent_with(Some(r#"[{"broker":"b2"}]"#));
        b.uid = "another-uid".into();

        let labels = make_labels(&a);

        assert_eq!(labels, make_labels(&b));
        assert_eq!(labels.get(K8S_MANAGED_BY).unwrap(), "autotrigger");
        assert_eq!(labels.get(AUTOTRIGGER_PARENT_KIND_LABEL).unwrap(), "Service");
        assert_eq!(
            labels.get(AUTOTRIGGER_PARENT_NAME_LABEL).unwrap(),
            "event-display"
        );
    }

    #[test]
    fn test_name_prefix_uses_name_and_kind() {
        assert_eq!(
            trigger_name_prefix(&parent_with(None)),
            "event-display-service"
        );
    }

    #[test]
    fn test_name_prefix_is_bounded() {
        let mut parent = parent_with(None);
        parent.name = "a".repeat(120);

        let prefix = trigger_name_prefix(&parent);

        assert_eq!(prefix.len(), MAX_GENERATE_NAME_PREFIX_LEN - 1);
    }

    #[test]
    fn test_owner_reference_is_controller() {
        let owner = make_owner_reference(&parent_with(None));

        assert_eq!(owner.api_version, "serving.knative.dev/v1");
        assert_eq!(owner.kind, "Service");
        assert_eq!(owner.name, "event-display");
        assert_eq!(owner.uid, "uid-1");
        assert_eq!(owner.controller, Some(true));
        assert_eq!(owner.block_owner_deletion, Some(true));
    }

    #[test]
    fn test_subscriber_references_parent() {
        let subscriber = make_subscriber(&parent_with(None));
        let reference = subscriber.reference.unwrap();

        assert_eq!(reference.api_version, "serving.knative.dev/v1");
        assert_eq!(reference.kind, "Service");
        assert_eq!(reference.name, "event-display");
        assert!(reference.namespace.is_none());
        assert!(subscriber.uri.is_none());
    }

    #[test]
    fn test_no_annotation_builds_nothing() {
        let triggers = make_triggers(&parent_with(None), FilterSchema::Attributes).unwrap();
        assert!(triggers.is_empty());
    }

    #[test]
    fn test_malformed_annotation_fails() {
        let err = make_triggers(&parent_with(Some("not json")), FilterSchema::Attributes)
            .unwrap_err();
        assert!(matches!(err, AutoTriggerError::AnnotationParse { .. }));
    }

    #[test]
    fn test_builds_one_trigger_per_filter_in_order() {
        let parent = parent_with(Some(r#"[{"type":"foo","source":"bar"},{"broker":"b2"}]"#));

        let triggers = make_triggers(&parent, FilterSchema::Attributes).unwrap();

        assert_eq!(triggers.len(), 2);

        let first = &triggers[0];
        assert_eq!(first.spec.broker, "default");
        assert_eq!(
            first.spec.filter.as_ref().unwrap().attributes,
            Some(BTreeMap::from([
                ("source".to_string(), "bar".to_string()),
                ("type".to_string(), "foo".to_string()),
            ]))
        );

        let second = &triggers[1];
        assert_eq!(second.spec.broker, "b2");
        assert_eq!(
            second.spec.filter.as_ref().unwrap().attributes,
            Some(BTreeMap::new())
        );
    }

    #[test]
    fn test_trigger_metadata() {
        let parent = parent_with(Some(""));

        let triggers = make_triggers(&parent, FilterSchema::Attributes).unwrap();
        let trigger = &triggers[0];

        assert!(trigger.metadata.name.is_none());
        assert_eq!(
            trigger.metadata.generate_name.as_deref(),
            Some("event-display-service-")
        );
        assert_eq!(trigger.metadata.namespace.as_deref(), Some("default"));
        assert_eq!(trigger.metadata.labels.as_ref(), Some(&make_labels(&parent)));
        assert_eq!(
            trigger.metadata.owner_references.as_deref(),
            Some(&[make_owner_reference(&parent)][..])
        );
        assert_eq!(trigger.spec.subscriber, make_subscriber(&parent));
        assert!(trigger.spec.deprecated_generation.is_none());
    }

    #[test]
    fn test_source_and_type_schema_builds_legacy_filter() {
        let parent = parent_with(Some(r#"[{"type":"foo","source":"bar"}]"#));

        let triggers = make_triggers(&parent, FilterSchema::SourceAndType).unwrap();
        let filter = triggers[0].spec.filter.clone().unwrap();

        assert!(filter.attributes.is_none());
        let source_and_type = filter.source_and_type.unwrap();
        assert_eq!(source_and_type.event_type, "foo");
        assert_eq!(source_and_type.source, "bar");
    }
}
