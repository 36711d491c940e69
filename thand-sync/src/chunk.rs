//! `GetLocalConfigurationChunk` (§4.G): the chunk-builder contract.

use std::collections::HashMap;
use thand_core::model::limits::{CHUNK_ITEM_OVERHEAD, MAX_CHUNK_SIZE};
use thand_core::{ConfigurationCursor, CursorSection, Provider, ProviderChunkData, Role, SystemChunk};

/// The full in-memory configuration the chunk builder pages through.
#[derive(Debug, Clone, Default)]
pub struct ConfigurationSnapshot {
    pub roles: HashMap<String, Role>,
    pub workflows: HashMap<String, serde_json::Value>,
    pub providers: HashMap<String, Provider>,
    pub provider_data: HashMap<String, ProviderChunkData>,
}

/// Builds one bounded chunk starting at `cursor` (`None` ⇒ `{roles, 0}`).
/// Returns the chunk plus the cursor to resume from, or `None` once every
/// section has been fully paged (terminal completion, §4.G).
pub fn get_local_configuration_chunk(
    snapshot: &ConfigurationSnapshot,
    cursor: Option<ConfigurationCursor>,
) -> (SystemChunk, Option<ConfigurationCursor>) {
    let mut cursor = cursor.unwrap_or_else(ConfigurationCursor::initial);
    let mut chunk = SystemChunk::default();
    let mut running_size: usize = 0;

    loop {
        if cursor.is_done() {
            return (chunk, None);
        }

        let keys = sorted_keys(snapshot, cursor.section);
        let mut offset = cursor.offset;

        while offset < keys.len() {
            let key = &keys[offset];
            let item_size = item_size(snapshot, cursor.section, key);

            // `running_size > 0` guards a single item larger than
            // `MaxChunkSize` on its own: it still gets included (a chunk of
            // one) rather than splitting forever on the same offset.
            if running_size + item_size > MAX_CHUNK_SIZE && running_size > 0 {
                return (chunk, Some(ConfigurationCursor { section: cursor.section, offset }));
            }

            insert_item(&mut chunk, snapshot, cursor.section, key);
            running_size += item_size;
            offset += 1;
        }

        cursor = ConfigurationCursor { section: cursor.section.next(), offset: 0 };
    }
}

fn sorted_keys(snapshot: &ConfigurationSnapshot, section: CursorSection) -> Vec<String> {
    let mut keys: Vec<String> = match section {
        CursorSection::Roles => snapshot.roles.keys().cloned().collect(),
        CursorSection::Workflows => snapshot.workflows.keys().cloned().collect(),
        CursorSection::Providers => snapshot.providers.keys().cloned().collect(),
        CursorSection::Done => Vec::new(),
    };
    keys.sort();
    keys
}

fn item_size(snapshot: &ConfigurationSnapshot, section: CursorSection, key: &str) -> usize {
    let payload_size = match section {
        CursorSection::Roles => {
            snapshot.roles.get(key).map(|v| serde_json::to_vec(v).map(|b| b.len()).unwrap_or(0)).unwrap_or(0)
        }
        CursorSection::Workflows => {
            snapshot.workflows.get(key).map(|v| serde_json::to_vec(v).map(|b| b.len()).unwrap_or(0)).unwrap_or(0)
        }
        CursorSection::Providers => {
            let def_size = snapshot
                .providers
                .get(key)
                .map(|v| serde_json::to_vec(v).map(|b| b.len()).unwrap_or(0))
                .unwrap_or(0);
            let data_size = snapshot
                .provider_data
                .get(key)
                .map(|v| serde_json::to_vec(v).map(|b| b.len()).unwrap_or(0))
                .unwrap_or(0);
            def_size + data_size
        }
        CursorSection::Done => 0,
    };
    payload_size + key.len() + CHUNK_ITEM_OVERHEAD
}

fn insert_item(chunk: &mut SystemChunk, snapshot: &ConfigurationSnapshot, section: CursorSection, key: &str) {
    match section {
        CursorSection::Roles => {
            if let Some(v) = snapshot.roles.get(key) {
                chunk.roles.insert(key.to_string(), v.clone());
            }
        }
        CursorSection::Workflows => {
            if let Some(v) = snapshot.workflows.get(key) {
                chunk.workflows.insert(key.to_string(), v.clone());
            }
        }
        CursorSection::Providers => {
            if let Some(v) = snapshot.providers.get(key) {
                chunk.providers.insert(key.to_string(), v.clone());
            }
            if let Some(v) = snapshot.provider_data.get(key) {
                chunk.provider_data.insert(key.to_string(), v.clone());
            }
        }
        CursorSection::Done => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(name: &str) -> Role {
        Role { name: name.to_string(), enabled: true, ..Default::default() }
    }

    #[test]
    fn empty_snapshot_completes_immediately() {
        let snapshot = ConfigurationSnapshot::default();
        let (chunk, next) = get_local_configuration_chunk(&snapshot, None);
        assert!(chunk.roles.is_empty());
        assert!(next.is_none());
    }

    #[test]
    fn small_snapshot_paginates_through_every_section_in_one_call() {
        let mut snapshot = ConfigurationSnapshot::default();
        snapshot.roles.insert("b-role".into(), role("b-role"));
        snapshot.roles.insert("a-role".into(), role("a-role"));
        snapshot.providers.insert(
            "aws-prod".into(),
            Provider { name: "aws-prod".into(), engine: "aws".into(), enabled: true, ..Default::default() },
        );

        let (chunk, next) = get_local_configuration_chunk(&snapshot, None);
        assert_eq!(chunk.roles.len(), 2);
        assert_eq!(chunk.providers.len(), 1);
        assert!(next.is_none());
    }

    #[test]
    fn oversized_item_forces_a_cursor_split() {
        let mut snapshot = ConfigurationSnapshot::default();
        for i in 0..5 {
            let mut r = role(&format!("role-{i}"));
            r.description = "x".repeat(MAX_CHUNK_SIZE / 2);
            snapshot.roles.insert(r.name.clone(), r);
        }

        let (first_chunk, next) = get_local_configuration_chunk(&snapshot, None);
        assert!(first_chunk.roles.len() < 5);
        let next = next.expect("chunk sequence must continue");
        assert_eq!(next.section, CursorSection::Roles);

        let (second_chunk, _) = get_local_configuration_chunk(&snapshot, Some(next));
        assert!(!second_chunk.roles.is_empty());

        let mut seen: Vec<String> = first_chunk.roles.keys().chain(second_chunk.roles.keys()).cloned().collect();
        seen.sort();
        seen.dedup();
        assert!(seen.len() >= 2);
    }

    #[test]
    fn resuming_from_done_cursor_yields_empty_chunk() {
        let snapshot = ConfigurationSnapshot::default();
        let done = ConfigurationCursor { section: CursorSection::Done, offset: 0 };
        let (chunk, next) = get_local_configuration_chunk(&snapshot, Some(done));
        assert!(chunk.roles.is_empty());
        assert!(next.is_none());
    }
}
