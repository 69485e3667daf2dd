use crate::model::NormalizedResource;
use sgaudit_types::{
    Component, InventoryItem, Link, OriginActor, Property, Subject, SubjectType, ids,
};

const COMPONENT_DESCRIPTION: &str = "Amazon Security Groups act as virtual firewalls for AWS \
resources such as EC2 instances and RDS databases. They control inbound and outbound traffic \
at the instance level using rule-based configurations tied to ports, protocols, and CIDR ranges. \
Security Groups are stateful and can reference other groups to enforce dynamic trust boundaries \
within a VPC.";

const COMPONENT_PURPOSE: &str = "To enforce network segmentation and access control policies \
at the resource level, providing a configurable and auditable security boundary for cloud-based \
assets in support of least privilege and Zero Trust architectures.";

/// Who produced the evidence and what it is about, for one resource.
#[derive(Clone, Debug, PartialEq)]
pub struct EvidenceContext {
    pub subjects: Vec<Subject>,
    pub origins: Vec<OriginActor>,
    pub components: Vec<Component>,
    pub inventory: Vec<InventoryItem>,
}

impl EvidenceContext {
    pub fn for_security_group(resource: &NormalizedResource) -> Self {
        let inventory_id = format!("{}/{}", ids::INVENTORY_PREFIX_SECURITY_GROUP, resource.id);

        let mut props = vec![Property {
            name: "group-id".to_string(),
            value: resource.id.clone(),
        }];
        if let Some(name) = &resource.name {
            props.push(Property {
                name: "group-name".to_string(),
                value: name.clone(),
            });
        }
        if let Some(vpc) = &resource.container {
            props.push(Property {
                name: "vpc-id".to_string(),
                value: vpc.clone(),
            });
        }

        Self {
            subjects: vec![
                Subject {
                    subject_type: SubjectType::Component,
                    identifier: ids::COMPONENT_SECURITY_GROUP.to_string(),
                },
                Subject {
                    subject_type: SubjectType::InventoryItem,
                    identifier: inventory_id.clone(),
                },
            ],
            origins: default_origins(),
            components: vec![Component {
                identifier: ids::COMPONENT_SECURITY_GROUP.to_string(),
                component_type: "service".to_string(),
                title: "Amazon Security Groups".to_string(),
                description: COMPONENT_DESCRIPTION.to_string(),
                purpose: COMPONENT_PURPOSE.to_string(),
            }],
            inventory: vec![InventoryItem {
                identifier: inventory_id,
                item_type: "firewall".to_string(),
                title: format!("Amazon Security Group [{}]", resource.id),
                props,
                implemented_components: vec![ids::COMPONENT_SECURITY_GROUP.to_string()],
            }],
        }
    }
}

fn default_origins() -> Vec<OriginActor> {
    vec![
        OriginActor {
            title: ids::ACTOR_PLATFORM_TITLE.to_string(),
            actor_type: "assessment-platform".to_string(),
            links: vec![reference_link(ids::ACTOR_PLATFORM_URL, ids::ACTOR_PLATFORM_TITLE)],
        },
        OriginActor {
            title: ids::ACTOR_TOOL_TITLE.to_string(),
            actor_type: "tool".to_string(),
            links: vec![reference_link(ids::ACTOR_TOOL_URL, ids::ACTOR_TOOL_TITLE)],
        },
    ]
}

fn reference_link(href: &str, text: &str) -> Link {
    Link {
        href: href.to_string(),
        rel: Some("reference".to_string()),
        text: Some(text.to_string()),
    }
}
