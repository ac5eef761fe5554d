//! Codec for the wpa_supplicant credential store.
//!
//! The store is a preamble of global settings followed by repeated
//! `network={ ... }` blocks of `key=value` lines. The preamble is kept
//! byte-for-byte on rewrite; only the network blocks are regenerated.

/// Priority written to configured networks so the supplicant prefers
/// the most recently commissioned one.
const NEW_NETWORK_PRIORITY: &str = "10";

/// Keys whose values are double-quoted in the store
const QUOTED_KEYS: [&str; 2] = ["ssid", "psk"];

/// One `network={ ... }` block, fields in file order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialRecord {
    fields: Vec<(String, String)>,
}

impl CredentialRecord {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Replace the value in place, or append the key if absent
    pub fn set(&mut self, key: &str, value: &str) {
        match self.fields.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value.to_string(),
            None => self.fields.push((key.to_string(), value.to_string())),
        }
    }

    pub fn ssid(&self) -> Option<&str> {
        self.get("ssid")
    }
}

/// Parsed credential store: verbatim preamble plus network blocks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialStore {
    header: String,
    records: Vec<CredentialRecord>,
}

impl CredentialStore {
    /// Parse the store text. Malformed lines are skipped rather than
    /// failing the whole file, and `disabled` flags do not survive.
    pub fn parse(content: &str) -> Self {
        let mut chunks = content.split("network={");
        let header = chunks.next().unwrap_or_default().to_string();
        let records = chunks.map(parse_record).collect();
        Self { header, records }
    }

    /// Update the passphrase of the record matching `ssid`, or append a
    /// fresh WPA-PSK record if none matches. Matching is case sensitive
    /// and the touched record always gets the top priority.
    pub fn upsert(&mut self, ssid: &str, psk: &str) {
        match self.records.iter_mut().find(|r| r.ssid() == Some(ssid)) {
            Some(record) => {
                record.set("psk", psk);
                record.set("priority", NEW_NETWORK_PRIORITY);
            }
            None => {
                let mut record = CredentialRecord::default();
                record.set("ssid", ssid);
                record.set("psk", psk);
                record.set("key_mgmt", "WPA-PSK");
                record.set("priority", NEW_NETWORK_PRIORITY);
                self.records.push(record);
            }
        }
    }

    pub fn serialize(&self) -> String {
        let mut out = self.header.clone();
        for record in &self.records {
            out.push_str("network={\n");
            for (key, value) in &record.fields {
                if QUOTED_KEYS.contains(&key.as_str()) {
                    out.push_str(&format!("    {}=\"{}\"\n", key, escape_quotes(value)));
                } else {
                    out.push_str(&format!("    {}={}\n", key, value));
                }
            }
            out.push_str("}\n\n");
        }
        out
    }

    pub fn record(&self, ssid: &str) -> Option<&CredentialRecord> {
        self.records.iter().find(|r| r.ssid() == Some(ssid))
    }

    pub fn records(&self) -> &[CredentialRecord] {
        &self.records
    }

    pub fn header(&self) -> &str {
        &self.header
    }
}

fn parse_record(block: &str) -> CredentialRecord {
    let mut record = CredentialRecord::default();
    for line in block.lines() {
        let line = line.trim();
        if line == "}" {
            break;
        }
        if line.is_empty() {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key == "disabled" {
            continue;
        }
        record.set(key, &unquote(value.trim()));
    }
    record
}

fn unquote(value: &str) -> String {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .map(|inner| inner.replace("\\\"", "\""))
        .unwrap_or_else(|| value.to_string())
}

fn escape_quotes(value: &str) -> String {
    value.replace('"', "\\\"")
}
