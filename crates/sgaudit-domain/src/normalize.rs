//! Resource normalizer: provider-native security group -> attribute document + labels.

use crate::model::{
    IpPermission, IpRange, Ipv6Range, NormalizedResource, PrefixListId, ResourceDocument,
    SecurityGroup, Tag, UserIdGroupPair,
};
use serde_json::{Map, Value, json};
use sgaudit_types::{Labels, ids};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizeError {
    #[error("security group has no group id (name: {})", .name.as_deref().unwrap_or("<unnamed>"))]
    MissingGroupId { name: Option<String> },
}

/// Normalize one security group.
///
/// Only the attributes policies evaluate are kept. Absent optional fields are omitted from
/// the document, never replaced by placeholders. The group id is the only required field.
pub fn normalize(group: &SecurityGroup) -> Result<NormalizedResource, NormalizeError> {
    let id = non_empty(group.group_id.as_deref()).ok_or_else(|| NormalizeError::MissingGroupId {
        name: group.group_name.clone(),
    })?;

    let mut doc = Map::new();
    doc.insert("GroupId".into(), json!(id));
    insert_str(&mut doc, "GroupName", group.group_name.as_deref());
    insert_str(&mut doc, "Description", group.description.as_deref());
    insert_str(&mut doc, "OwnerId", group.owner_id.as_deref());
    insert_str(&mut doc, "VpcId", group.vpc_id.as_deref());
    if let Some(perms) = &group.ip_permissions {
        doc.insert("IpPermissions".into(), permissions_to_value(perms));
    }
    if let Some(perms) = &group.ip_permissions_egress {
        doc.insert("IpPermissionsEgress".into(), permissions_to_value(perms));
    }
    if let Some(tags) = &group.tags {
        doc.insert("Tags".into(), tags_to_value(tags));
    }

    let container = non_empty(group.vpc_id.as_deref()).map(str::to_string);

    let mut labels = Labels::new();
    labels.insert(ids::LABEL_PROVIDER.into(), ids::PROVIDER_AWS.into());
    labels.insert(
        ids::LABEL_TYPE.into(),
        ids::RESOURCE_TYPE_SECURITY_GROUP.into(),
    );
    labels.insert(ids::LABEL_GROUP_ID.into(), id.to_string());
    if let Some(vpc) = &container {
        labels.insert(ids::LABEL_VPC_ID.into(), vpc.clone());
    }

    Ok(NormalizedResource {
        id: id.to_string(),
        resource_type: ids::RESOURCE_TYPE_SECURITY_GROUP.to_string(),
        name: non_empty(group.group_name.as_deref()).map(str::to_string),
        container,
        document: ResourceDocument::new(doc),
        labels,
    })
}

fn non_empty(v: Option<&str>) -> Option<&str> {
    v.filter(|s| !s.trim().is_empty())
}

fn insert_str(obj: &mut Map<String, Value>, key: &str, value: Option<&str>) {
    if let Some(v) = value {
        obj.insert(key.into(), json!(v));
    }
}

fn permissions_to_value(perms: &[IpPermission]) -> Value {
    Value::Array(perms.iter().map(permission_to_value).collect())
}

fn permission_to_value(perm: &IpPermission) -> Value {
    let mut obj = Map::new();
    insert_str(&mut obj, "IpProtocol", perm.ip_protocol.as_deref());
    if let Some(p) = perm.from_port {
        obj.insert("FromPort".into(), json!(p));
    }
    if let Some(p) = perm.to_port {
        obj.insert("ToPort".into(), json!(p));
    }
    if let Some(ranges) = &perm.ip_ranges {
        obj.insert(
            "IpRanges".into(),
            Value::Array(ranges.iter().map(ip_range_to_value).collect()),
        );
    }
    if let Some(ranges) = &perm.ipv6_ranges {
        obj.insert(
            "Ipv6Ranges".into(),
            Value::Array(ranges.iter().map(ipv6_range_to_value).collect()),
        );
    }
    if let Some(lists) = &perm.prefix_list_ids {
        obj.insert(
            "PrefixListIds".into(),
            Value::Array(lists.iter().map(prefix_list_to_value).collect()),
        );
    }
    if let Some(pairs) = &perm.user_id_group_pairs {
        obj.insert(
            "UserIdGroupPairs".into(),
            Value::Array(pairs.iter().map(group_pair_to_value).collect()),
        );
    }
    Value::Object(obj)
}

fn ip_range_to_value(range: &IpRange) -> Value {
    let mut obj = Map::new();
    insert_str(&mut obj, "CidrIp", range.cidr_ip.as_deref());
    insert_str(&mut obj, "Description", range.description.as_deref());
    Value::Object(obj)
}

fn ipv6_range_to_value(range: &Ipv6Range) -> Value {
    let mut obj = Map::new();
    insert_str(&mut obj, "CidrIpv6", range.cidr_ipv6.as_deref());
    insert_str(&mut obj, "Description", range.description.as_deref());
    Value::Object(obj)
}

fn prefix_list_to_value(list: &PrefixListId) -> Value {
    let mut obj = Map::new();
    insert_str(&mut obj, "PrefixListId", list.prefix_list_id.as_deref());
    insert_str(&mut obj, "Description", list.description.as_deref());
    Value::Object(obj)
}

fn group_pair_to_value(pair: &UserIdGroupPair) -> Value {
    let mut obj = Map::new();
    insert_str(&mut obj, "GroupId", pair.group_id.as_deref());
    insert_str(&mut obj, "GroupName", pair.group_name.as_deref());
    insert_str(&mut obj, "UserId", pair.user_id.as_deref());
    insert_str(&mut obj, "VpcId", pair.vpc_id.as_deref());
    insert_str(&mut obj, "Description", pair.description.as_deref());
    Value::Object(obj)
}

/// Tags become a `key -> value` object; entries without a key are dropped.
fn tags_to_value(tags: &[Tag]) -> Value {
    let mut obj = Map::new();
    for tag in tags {
        if let Some(key) = tag.key.as_deref() {
            obj.insert(key.into(), json!(tag.value.as_deref().unwrap_or_default()));
        }
    }
    Value::Object(obj)
}
