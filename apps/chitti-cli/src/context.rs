use std::path::Path;
use std::sync::Arc;

use chitti_config::LedgerConfig;
use chitti_core::{Ledger, SeededRandom};
use chitti_events_memory::MemoryEventBus;
use chitti_storage::{Group, GroupId, Member, MemberId};
use chitti_store_local::LocalStore;
use tracing::debug;

pub type CliLedger = Ledger<LocalStore, MemoryEventBus>;

/// Global flags every command needs to build its ledger.
#[derive(Clone, Copy, Debug, Default)]
pub struct Settings<'a> {
    pub config: Option<&'a Path>,
    pub data_file: Option<&'a Path>,
    pub seed: Option<u64>,
}

/// Load config, open the ledger document and build the ledger.
pub async fn setup_ledger(
    config_path: Option<&Path>,
    data_file: Option<&Path>,
    seed: Option<u64>,
) -> Result<CliLedger, Box<dyn std::error::Error>> {
    let config_path = match config_path {
        Some(path) => path.to_path_buf(),
        None => LedgerConfig::default_path()?,
    };
    let mut config = LedgerConfig::load_or_default(&config_path)?.with_env_overrides()?;
    if let Some(path) = data_file {
        config.data_file = Some(path.to_path_buf());
    }

    let store = match &config.data_file {
        Some(path) => LocalStore::open(path).await?,
        None => LocalStore::open_default().await?,
    };
    debug!(
        config = %config_path.display(),
        data_file = ?store.path(),
        surcharge = config.surcharge_amount,
        "ledger ready"
    );

    let ledger = Ledger::new(Arc::new(store), Arc::new(MemoryEventBus::new()), config);
    Ok(match seed {
        Some(seed) => ledger.with_random_source(SeededRandom::new(seed)),
        None => ledger,
    })
}

/// Find a group by ID, or else by case-insensitive name.
pub async fn resolve_group(
    ledger: &CliLedger,
    group: &str,
) -> Result<Group, Box<dyn std::error::Error>> {
    if let Ok(id) = group.parse::<GroupId>() {
        return Ok(ledger.get_group(id).await?);
    }
    let lowered = group.trim().to_lowercase();
    let mut matches: Vec<Group> = ledger
        .list_groups()
        .await?
        .into_iter()
        .filter(|g| g.name.to_lowercase() == lowered)
        .collect();
    match matches.len() {
        0 => Err(format!("No group named '{group}'").into()),
        1 => Ok(matches.remove(0)),
        n => Err(format!("{n} groups are named '{group}'; use the group ID").into()),
    }
}

/// Find a member of `group` by ID or case-insensitive name.
pub fn resolve_member<'a>(
    group: &'a Group,
    member: &str,
) -> Result<&'a Member, Box<dyn std::error::Error>> {
    if let Ok(id) = member.parse::<MemberId>() {
        return group
            .find_member(&id)
            .ok_or_else(|| format!("Member {id} is not in group '{}'", group.name).into());
    }
    let lowered = member.trim().to_lowercase();
    group
        .members
        .iter()
        .find(|m| m.name.to_lowercase() == lowered)
        .ok_or_else(|| format!("No member named '{member}' in group '{}'", group.name).into())
}

pub fn resolve_members(
    group: &Group,
    members: &[String],
) -> Result<Vec<MemberId>, Box<dyn std::error::Error>> {
    members
        .iter()
        .map(|m| resolve_member(group, m).map(|m| m.id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chitti_core::NewGroup;

    fn ledger() -> CliLedger {
        Ledger::new(
            Arc::new(LocalStore::in_memory()),
            Arc::new(MemoryEventBus::new()),
            LedgerConfig::default(),
        )
    }

    #[tokio::test]
    async fn resolves_groups_and_members_by_name_or_id() {
        let ledger = ledger();
        let group = ledger
            .create_group(NewGroup {
                name: "Friends Fund".to_string(),
                monthly_amount: 5000,
                commission_percent: 0,
                member_names: vec!["Asha".into(), "Bala".into()],
            })
            .await
            .unwrap();

        let by_name = resolve_group(&ledger, "friends fund").await.unwrap();
        assert_eq!(by_name.id, group.id);
        let by_id = resolve_group(&ledger, &group.id.to_string()).await.unwrap();
        assert_eq!(by_id.id, group.id);
        assert!(resolve_group(&ledger, "Other").await.is_err());

        assert_eq!(resolve_member(&group, "BALA").unwrap().name, "Bala");
        let asha = group.members[0].id.to_string();
        assert_eq!(resolve_member(&group, &asha).unwrap().name, "Asha");
        assert!(resolve_member(&group, "Chitra").is_err());

        let ids = resolve_members(&group, &["asha".into(), "bala".into()]).unwrap();
        assert_eq!(ids, vec![group.members[0].id, group.members[1].id]);
    }

    #[tokio::test]
    async fn data_file_flag_overrides_config() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        let data_file = dir.path().join("ledger.json");

        let ledger = setup_ledger(Some(&config_path), Some(&data_file), Some(1))
            .await
            .unwrap();
        assert_eq!(ledger.store().path(), Some(data_file.as_path()));
        assert_eq!(ledger.config().data_file.as_deref(), Some(data_file.as_path()));
    }
}
