use crate::ports::{ProviderSession, ResourceSupplier};
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use sgaudit_domain::SecurityGroup;

/// `DescribeSecurityGroups` response body, or a bare list of groups.
#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotFile {
    List(Vec<SecurityGroup>),
    Response {
        #[serde(rename = "SecurityGroups", default)]
        security_groups: Vec<SecurityGroup>,
    },
}

/// Supplies security groups from a captured `DescribeSecurityGroups` snapshot.
///
/// `path` is either a JSON file, or a directory holding one `<region>.json` per region; the
/// directory form needs a region from the provider session.
#[derive(Clone, Debug)]
pub struct SnapshotSupplier {
    path: Utf8PathBuf,
}

impl SnapshotSupplier {
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn resolve_file(&self, session: &ProviderSession) -> anyhow::Result<Utf8PathBuf> {
        if !self.path.is_dir() {
            return Ok(self.path.clone());
        }
        let region = session
            .region
            .as_deref()
            .with_context(|| format!("snapshot directory {} needs a region", self.path))?;
        Ok(self.path.join(format!("{region}.json")))
    }

    fn load(&self, session: &ProviderSession) -> anyhow::Result<Vec<SecurityGroup>> {
        let file = self.resolve_file(session)?;
        read_snapshot(&file)
    }
}

fn read_snapshot(file: &Utf8Path) -> anyhow::Result<Vec<SecurityGroup>> {
    let text =
        std::fs::read_to_string(file).with_context(|| format!("read snapshot: {file}"))?;
    let parsed: SnapshotFile =
        serde_json::from_str(&text).with_context(|| format!("parse snapshot: {file}"))?;
    Ok(match parsed {
        SnapshotFile::List(groups) => groups,
        SnapshotFile::Response { security_groups } => security_groups,
    })
}

impl ResourceSupplier for SnapshotSupplier {
    fn security_groups<'a>(
        &'a self,
        session: &ProviderSession,
    ) -> Box<dyn Iterator<Item = anyhow::Result<SecurityGroup>> + 'a> {
        match self.load(session) {
            Ok(groups) => {
                tracing::debug!(path = %self.path, count = groups.len(), "loaded snapshot");
                Box::new(groups.into_iter().map(Ok))
            }
            Err(err) => Box::new(std::iter::once(Err(err))),
        }
    }
}

/// Supplies a fixed sequence of items, failures included. Useful for embedding and tests.
#[derive(Default)]
pub struct StaticSupplier {
    items: Vec<Result<SecurityGroup, String>>,
}

impl StaticSupplier {
    pub fn new(groups: Vec<SecurityGroup>) -> Self {
        Self {
            items: groups.into_iter().map(Ok).collect(),
        }
    }

    /// Append a failure after the groups supplied so far.
    pub fn then_fail(mut self, message: impl Into<String>) -> Self {
        self.items.push(Err(message.into()));
        self
    }
}

impl ResourceSupplier for StaticSupplier {
    fn security_groups<'a>(
        &'a self,
        _session: &ProviderSession,
    ) -> Box<dyn Iterator<Item = anyhow::Result<SecurityGroup>> + 'a> {
        Box::new(self.items.iter().map(|item| match item {
            Ok(group) => Ok(group.clone()),
            Err(message) => Err(anyhow::anyhow!("{message}")),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Utf8Path, name: &str, text: &str) -> Utf8PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, text).expect("write snapshot");
        path
    }

    fn tempdir() -> (tempfile::TempDir, Utf8PathBuf) {
        let tmp = tempfile::tempdir().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf8 path");
        (tmp, root)
    }

    #[test]
    fn reads_response_shape() {
        let (_tmp, root) = tempdir();
        let file = write(
            &root,
            "sg.json",
            r#"{"SecurityGroups":[{"GroupId":"sg-1"},{"GroupId":"sg-2","VpcId":"vpc-1"}]}"#,
        );
        let supplier = SnapshotSupplier::new(file);
        let groups: Vec<_> = supplier
            .security_groups(&ProviderSession::default())
            .collect::<anyhow::Result<_>>()
            .expect("groups");
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[1].vpc_id.as_deref(), Some("vpc-1"));
    }

    #[test]
    fn directory_snapshot_is_keyed_by_region() {
        let (_tmp, root) = tempdir();
        write(&root, "eu-west-2.json", r#"[{"GroupId":"sg-eu"}]"#);
        let supplier = SnapshotSupplier::new(root.clone());

        let session = ProviderSession {
            region: Some("eu-west-2".to_string()),
        };
        let groups: Vec<_> = supplier
            .security_groups(&session)
            .collect::<anyhow::Result<_>>()
            .expect("groups");
        assert_eq!(groups[0].group_id.as_deref(), Some("sg-eu"));

        let mut items = supplier.security_groups(&ProviderSession::default());
        let err = items.next().expect("one item").expect_err("needs region");
        assert!(format!("{err:#}").contains("needs a region"));
        assert!(items.next().is_none());
    }

    #[test]
    fn unreadable_snapshot_yields_single_error() {
        let supplier = SnapshotSupplier::new("/nonexistent/sgaudit/snapshot.json");
        let items: Vec<_> = supplier.security_groups(&ProviderSession::default()).collect();
        assert_eq!(items.len(), 1);
        assert!(items[0].is_err());
    }

    #[test]
    fn static_supplier_keeps_order_of_failures() {
        let supplier = StaticSupplier::new(vec![SecurityGroup::default()]).then_fail("throttled");
        let items: Vec<_> = supplier.security_groups(&ProviderSession::default()).collect();
        assert!(items[0].is_ok());
        assert_eq!(items[1].as_ref().expect_err("fails").to_string(), "throttled");
    }
}
