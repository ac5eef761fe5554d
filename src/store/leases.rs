//! Reader for the dnsmasq lease table.
//!
//! One lease per line, whitespace separated:
//! `<expiry-timestamp> <mac> <ipv4> <hostname> [client-id]`.
//! The capture network hands out a single address, so only the first
//! line is ever relevant.

/// One row of the lease table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaseRecord {
    pub timestamp: i64,
    pub mac_address: String,
    pub ip_address: String,
    pub name: String,
}

/// Parse the first lease line. Returns `None` for an empty table or a
/// line that does not carry the four expected fields.
pub fn parse_first_lease(content: &str) -> Option<LeaseRecord> {
    let line = content.lines().next()?;
    let mut fields = line.split_whitespace();
    let timestamp = fields.next()?.parse().ok()?;
    let mac_address = fields.next()?.to_string();
    let ip_address = fields.next()?.to_string();
    let name = fields.next()?.to_string();
    Some(LeaseRecord {
        timestamp,
        mac_address,
        ip_address,
        name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_first_lease() {
        let lease = parse_first_lease(
            "1700000000 AA:BB:CC:DD:EE:FF 192.168.1.50 phone1 01:aa:bb:cc:dd:ee:ff\n",
        )
        .expect("lease parsed");

        assert_eq!(lease.timestamp, 1700000000);
        assert_eq!(lease.mac_address, "AA:BB:CC:DD:EE:FF");
        assert_eq!(lease.ip_address, "192.168.1.50");
        assert_eq!(lease.name, "phone1");
    }

    #[test]
    fn test_only_first_line_is_read() {
        let lease = parse_first_lease(
            "1700000000 AA:BB:CC:DD:EE:FF 192.168.1.50 phone1\n1700000100 11:22:33:44:55:66 192.168.1.51 phone2\n",
        )
        .expect("lease parsed");

        assert_eq!(lease.name, "phone1");
    }

    #[test]
    fn test_empty_table() {
        assert_eq!(parse_first_lease(""), None);
        assert_eq!(parse_first_lease("\n"), None);
    }

    #[test]
    fn test_short_line_is_rejected() {
        assert_eq!(parse_first_lease("1700000000 AA:BB:CC:DD:EE:FF\n"), None);
    }

    #[test]
    fn test_non_numeric_timestamp_is_rejected() {
        assert_eq!(
            parse_first_lease("soon AA:BB:CC:DD:EE:FF 192.168.1.50 phone1\n"),
            None
        );
    }
}
