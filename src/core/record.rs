use std::net::IpAddr;

/// A provider-agnostic DNS record.
///
/// Each variant carries only the fields that matter for its type. Every
/// variant can be projected down to a plain resource record with [`Record::rr`];
/// for composite types (SRV, service bindings) that projection is lossy and
/// [`Rr::parse`] is the type-keyed way back.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Record {
    /// A or AAAA, depending on the address family of `ip`.
    Address {
        name: String,
        ip: IpAddr,
        ttl: u32,
    },
    Cname {
        name: String,
        target: String,
        ttl: u32,
    },
    Ns {
        name: String,
        target: String,
        ttl: u32,
    },
    Txt {
        name: String,
        text: String,
        ttl: u32,
    },
    Mx {
        name: String,
        preference: u16,
        target: String,
        ttl: u32,
    },
    Srv {
        /// Service label without the leading underscore, e.g. `sip`.
        service: String,
        /// Transport label without the leading underscore, e.g. `tcp` or `udp`.
        transport: String,
        name: String,
        priority: u16,
        weight: u16,
        port: u16,
        target: String,
        ttl: u32,
    },
    Caa {
        name: String,
        flags: u8,
        tag: String,
        value: String,
        ttl: u32,
    },
    /// HTTPS/SVCB service binding. Part of the generic model; individual
    /// providers may not be able to represent it.
    Svcb {
        name: String,
        /// `https` or `svcb`.
        scheme: String,
        priority: u16,
        target: String,
        params: String,
        ttl: u32,
    },
    /// Any record expressed only as type + presentation data.
    Rr(Rr),
}

/// A DNS record in its least-common-denominator form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rr {
    /// Uppercase record type, e.g. `A`, `TLSA`, `SSHFP`.
    pub rtype: String,
    /// Name relative to the zone; `@` denotes the apex.
    pub name: String,
    /// Presentation-format record data.
    pub data: String,
    pub ttl: u32,
}

impl Record {
    /// Projects the record to its `{type, name, data, ttl}` form.
    ///
    /// SRV embeds service and transport into the projected name
    /// (`_sip._tcp.host`); MX, SRV, CAA and SVCB flatten their numeric fields
    /// into presentation data. [`Rr::parse`] reverses this for the types it
    /// knows.
    pub fn rr(&self) -> Rr {
        match self {
            Record::Address { name, ip, ttl } => Rr {
                rtype: if ip.is_ipv4() { "A" } else { "AAAA" }.to_string(),
                name: name.clone(),
                data: ip.to_string(),
                ttl: *ttl,
            },
            Record::Cname { name, target, ttl } => Rr {
                rtype: "CNAME".to_string(),
                name: name.clone(),
                data: target.clone(),
                ttl: *ttl,
            },
            Record::Ns { name, target, ttl } => Rr {
                rtype: "NS".to_string(),
                name: name.clone(),
                data: target.clone(),
                ttl: *ttl,
            },
            Record::Txt { name, text, ttl } => Rr {
                rtype: "TXT".to_string(),
                name: name.clone(),
                data: text.clone(),
                ttl: *ttl,
            },
            Record::Mx {
                name,
                preference,
                target,
                ttl,
            } => Rr {
                rtype: "MX".to_string(),
                name: name.clone(),
                data: format!("{preference} {target}"),
                ttl: *ttl,
            },
            Record::Srv {
                service,
                transport,
                name,
                priority,
                weight,
                port,
                target,
                ttl,
            } => Rr {
                rtype: "SRV".to_string(),
                name: format!("_{service}._{transport}.{name}"),
                data: format!("{priority} {weight} {port} {target}"),
                ttl: *ttl,
            },
            Record::Caa {
                name,
                flags,
                tag,
                value,
                ttl,
            } => Rr {
                rtype: "CAA".to_string(),
                name: name.clone(),
                data: format!("{flags} {tag} {value}"),
                ttl: *ttl,
            },
            Record::Svcb {
                name,
                scheme,
                priority,
                target,
                params,
                ttl,
            } => Rr {
                rtype: if scheme.eq_ignore_ascii_case("https") {
                    "HTTPS"
                } else {
                    "SVCB"
                }
                .to_string(),
                name: name.clone(),
                data: format!("{priority} {target} {params}"),
                ttl: *ttl,
            },
            Record::Rr(rr) => rr.clone(),
        }
    }
}

impl Rr {
    /// Re-types a plain resource record into the matching [`Record`] variant.
    ///
    /// Keyed on `rtype`: A and AAAA parse their address, MX and CAA split
    /// their presentation data, CNAME/NS/TXT map directly. Types without a
    /// dedicated variant stay [`Record::Rr`]. An A/AAAA record whose data is
    /// not a valid address is an error, as is MX/CAA data that does not split
    /// into the expected fields.
    pub fn parse(&self) -> Result<Record, String> {
        match self.rtype.as_str() {
            "A" | "AAAA" => {
                let ip: IpAddr = self
                    .data
                    .parse()
                    .map_err(|_| format!("invalid {} address: {}", self.rtype, self.data))?;
                Ok(Record::Address {
                    name: self.name.clone(),
                    ip,
                    ttl: self.ttl,
                })
            }
            "CNAME" => Ok(Record::Cname {
                name: self.name.clone(),
                target: self.data.clone(),
                ttl: self.ttl,
            }),
            "NS" => Ok(Record::Ns {
                name: self.name.clone(),
                target: self.data.clone(),
                ttl: self.ttl,
            }),
            "TXT" => Ok(Record::Txt {
                name: self.name.clone(),
                text: self.data.clone(),
                ttl: self.ttl,
            }),
            "MX" => {
                let mut parts = self.data.split_whitespace();
                let preference = parts
                    .next()
                    .and_then(|p| p.parse::<u16>().ok())
                    .ok_or_else(|| format!("invalid MX data: {}", self.data))?;
                let target = parts
                    .next()
                    .ok_or_else(|| format!("invalid MX data: {}", self.data))?;
                Ok(Record::Mx {
                    name: self.name.clone(),
                    preference,
                    target: target.to_string(),
                    ttl: self.ttl,
                })
            }
            "CAA" => {
                let mut parts = self.data.splitn(3, ' ');
                let flags = parts
                    .next()
                    .and_then(|p| p.parse::<u8>().ok())
                    .ok_or_else(|| format!("invalid CAA data: {}", self.data))?;
                let tag = parts
                    .next()
                    .ok_or_else(|| format!("invalid CAA data: {}", self.data))?;
                let value = parts
                    .next()
                    .ok_or_else(|| format!("invalid CAA data: {}", self.data))?;
                Ok(Record::Caa {
                    name: self.name.clone(),
                    flags,
                    tag: tag.to_string(),
                    value: value.to_string(),
                    ttl: self.ttl,
                })
            }
            _ => Ok(Record::Rr(self.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[test]
    fn test_address_projection_v4() {
        let rec = Record::Address {
            name: "www".into(),
            ip: IpAddr::V4(Ipv4Addr::new(1, 2, 3, 4)),
            ttl: 300,
        };
        let rr = rec.rr();
        assert_eq!(rr.rtype, "A");
        assert_eq!(rr.data, "1.2.3.4");
        assert_eq!(rr.parse().unwrap(), rec);
    }

    #[test]
    fn test_address_projection_v6() {
        let rec = Record::Address {
            name: "www".into(),
            ip: IpAddr::V6(Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 1)),
            ttl: 300,
        };
        let rr = rec.rr();
        assert_eq!(rr.rtype, "AAAA");
        assert_eq!(rr.data, "2001:db8::1");
        assert_eq!(rr.parse().unwrap(), rec);
    }

    #[test]
    fn test_srv_projection_embeds_service_and_transport() {
        let rec = Record::Srv {
            service: "sip".into(),
            transport: "tcp".into(),
            name: "host1".into(),
            priority: 10,
            weight: 20,
            port: 5060,
            target: "srv.example.com.".into(),
            ttl: 60,
        };
        let rr = rec.rr();
        assert_eq!(rr.name, "_sip._tcp.host1");
        assert_eq!(rr.data, "10 20 5060 srv.example.com.");
    }

    #[test]
    fn test_mx_round_trip_through_rr() {
        let rec = Record::Mx {
            name: "@".into(),
            preference: 10,
            target: "mail.example.com.".into(),
            ttl: 3600,
        };
        assert_eq!(rec.rr().parse().unwrap(), rec);
    }

    #[test]
    fn test_caa_round_trip_through_rr() {
        let rec = Record::Caa {
            name: "@".into(),
            flags: 0,
            tag: "issue".into(),
            value: "letsencrypt.org".into(),
            ttl: 300,
        };
        let rr = rec.rr();
        assert_eq!(rr.data, "0 issue letsencrypt.org");
        assert_eq!(rr.parse().unwrap(), rec);
    }

    #[test]
    fn test_parse_bad_address_is_error() {
        let rr = Rr {
            rtype: "A".into(),
            name: "www".into(),
            data: "not-an-ip".into(),
            ttl: 0,
        };
        assert!(rr.parse().is_err());
    }

    #[test]
    fn test_parse_unknown_type_stays_generic() {
        let rr = Rr {
            rtype: "TLSA".into(),
            name: "_443._tcp".into(),
            data: "3 1 1 abcdef".into(),
            ttl: 0,
        };
        assert_eq!(rr.parse().unwrap(), Record::Rr(rr));
    }

    #[test]
    fn test_svcb_projection_type_follows_scheme() {
        let rec = Record::Svcb {
            name: "@".into(),
            scheme: "https".into(),
            priority: 1,
            target: ".".into(),
            params: "alpn=h2".into(),
            ttl: 300,
        };
        assert_eq!(rec.rr().rtype, "HTTPS");
    }
}
