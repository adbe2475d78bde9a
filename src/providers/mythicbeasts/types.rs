use serde::{Deserialize, Serialize};

use crate::core::record::{Record, Rr};
use crate::providers::mythicbeasts::error::MythicBeastsError;

/// One record as the Mythic Beasts API represents it: a common
/// `{type, host, data, ttl}` core plus type-dependent extension fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MythicRecord {
    #[serde(rename = "type")]
    pub rtype: String,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub data: String,
    #[serde(default)]
    pub ttl: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mx_priority: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caa_flags: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caa_tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub srv_priority: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub srv_weight: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub srv_port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sshfp_algorithm: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sshfp_type: Option<u8>,
}

#[derive(Debug, Deserialize)]
pub struct MythicRecordsResponse {
    #[serde(default)]
    pub records: Vec<MythicRecord>,
}

#[derive(Debug, Serialize)]
pub struct MythicRecordsRequest {
    pub records: Vec<MythicRecord>,
}

/// Mutation responses only carry counters, never the affected records.
#[derive(Debug, Default, Deserialize)]
pub struct MythicRecordUpdate {
    #[serde(default)]
    pub records_added: u32,
    #[serde(default)]
    pub records_removed: u32,
}

/// Error body shape used by most endpoints: `{"errors": ["...", ...]}`.
#[derive(Debug, Deserialize)]
pub struct MythicErrors {
    pub errors: Vec<String>,
}

/// Fallback single-error body shape: `{"error": "..."}`.
#[derive(Debug, Deserialize)]
pub struct MythicError {
    pub error: String,
}

/// Types that carry no extension fields and map through [`Rr::parse`].
/// ANAME, DNAME and TLSA have no dedicated generic variant and stay `Rr`.
const SIMPLE_TYPES: [&str; 9] = [
    "A", "AAAA", "ANAME", "CNAME", "DNAME", "NS", "PTR", "TLSA", "TXT",
];

/// Decodes a full provider record array. Any single unknown or malformed
/// record fails the whole batch; nothing is silently dropped.
pub(crate) fn decode_records(records: &[MythicRecord]) -> Result<Vec<Record>, MythicBeastsError> {
    records.iter().map(decode_record).collect()
}

/// Dispatches on the wire `type` tag. The allow-list is strict: a type this
/// function does not know is a decode error, not a pass-through.
pub(crate) fn decode_record(raw: &MythicRecord) -> Result<Record, MythicBeastsError> {
    match raw.rtype.as_str() {
        t if SIMPLE_TYPES.contains(&t) => Rr {
            rtype: raw.rtype.clone(),
            name: raw.host.clone(),
            data: raw.data.clone(),
            ttl: raw.ttl,
        }
        .parse()
        .map_err(MythicBeastsError::Convert),
        "MX" => Ok(Record::Mx {
            name: raw.host.clone(),
            preference: raw.mx_priority.unwrap_or_default(),
            target: raw.data.clone(),
            ttl: raw.ttl,
        }),
        "CAA" => Ok(Record::Caa {
            name: raw.host.clone(),
            flags: raw.caa_flags.unwrap_or_default(),
            tag: raw.caa_tag.clone().unwrap_or_default(),
            value: raw.data.clone(),
            ttl: raw.ttl,
        }),
        "SRV" => {
            let (service, transport, name) = split_srv_host(&raw.host)?;
            Ok(Record::Srv {
                service,
                transport,
                name,
                priority: raw.srv_priority.unwrap_or_default(),
                weight: raw.srv_weight.unwrap_or_default(),
                port: raw.srv_port.unwrap_or_default(),
                target: raw.data.clone(),
                ttl: raw.ttl,
            })
        }
        "SSHFP" => {
            let (algorithm, fp_type, fingerprint) = match (raw.sshfp_algorithm, raw.sshfp_type) {
                (Some(algorithm), Some(fp_type)) => (algorithm, fp_type, raw.data.clone()),
                _ => split_sshfp_data(&raw.data)?,
            };
            Ok(Record::Rr(Rr {
                rtype: "SSHFP".to_string(),
                name: raw.host.clone(),
                data: format!("{algorithm} {fp_type} {fingerprint}"),
                ttl: raw.ttl,
            }))
        }
        other => Err(MythicBeastsError::UnknownRecordType(other.to_string())),
    }
}

pub(crate) fn encode_records(records: &[Record]) -> Result<Vec<MythicRecord>, MythicBeastsError> {
    records.iter().map(encode_record).collect()
}

/// Total over the supported variant set: every arm either emits a wire
/// record or a typed encode error. Service bindings are the one generic
/// variant this API cannot represent.
pub(crate) fn encode_record(record: &Record) -> Result<MythicRecord, MythicBeastsError> {
    match record {
        Record::Mx {
            name,
            preference,
            target,
            ttl,
        } => Ok(MythicRecord {
            rtype: "MX".to_string(),
            host: name.clone(),
            data: target.clone(),
            ttl: *ttl,
            mx_priority: Some(*preference),
            ..MythicRecord::default()
        }),
        Record::Caa {
            name,
            flags,
            tag,
            value,
            ttl,
        } => Ok(MythicRecord {
            rtype: "CAA".to_string(),
            host: name.clone(),
            data: value.clone(),
            ttl: *ttl,
            caa_flags: Some(*flags),
            caa_tag: Some(tag.clone()),
            ..MythicRecord::default()
        }),
        Record::Srv {
            service,
            transport,
            name,
            priority,
            weight,
            port,
            target,
            ttl,
        } => Ok(MythicRecord {
            rtype: "SRV".to_string(),
            host: format!("_{service}._{transport}.{name}"),
            data: target.clone(),
            ttl: *ttl,
            srv_priority: Some(*priority),
            srv_weight: Some(*weight),
            srv_port: Some(*port),
            ..MythicRecord::default()
        }),
        Record::Svcb { .. } => Err(MythicBeastsError::UnsupportedRecordType(
            record.rr().rtype,
        )),
        Record::Address { .. }
        | Record::Cname { .. }
        | Record::Ns { .. }
        | Record::Txt { .. }
        | Record::Rr(_) => {
            let rr = record.rr();
            if rr.rtype == "SSHFP" {
                encode_sshfp(&rr)
            } else {
                Ok(MythicRecord {
                    rtype: rr.rtype,
                    host: rr.name,
                    data: rr.data,
                    ttl: rr.ttl,
                    ..MythicRecord::default()
                })
            }
        }
    }
}

/// SRV wire hosts look like `_sip._tcp.host1`. Splits into service,
/// transport and name, trimming the leading underscores. Anything that does
/// not fit that shape is malformed input from the API.
fn split_srv_host(host: &str) -> Result<(String, String, String), MythicBeastsError> {
    let mut labels = host.splitn(3, '.');
    let (Some(service), Some(transport), Some(name)) =
        (labels.next(), labels.next(), labels.next())
    else {
        return Err(MythicBeastsError::MalformedSrvHost(host.to_string()));
    };
    let (Some(service), Some(transport)) =
        (service.strip_prefix('_'), transport.strip_prefix('_'))
    else {
        return Err(MythicBeastsError::MalformedSrvHost(host.to_string()));
    };
    Ok((service.to_string(), transport.to_string(), name.to_string()))
}

/// SSHFP presentation data is `<algorithm> <fp-type> <fingerprint>`, with
/// the first two fields numeric.
fn split_sshfp_data(data: &str) -> Result<(u8, u8, String), MythicBeastsError> {
    let parts: Vec<&str> = data.split_whitespace().collect();
    let [algorithm, fp_type, fingerprint] = parts.as_slice() else {
        return Err(MythicBeastsError::MalformedSshfp(data.to_string()));
    };
    let algorithm = algorithm
        .parse::<u8>()
        .map_err(|_| MythicBeastsError::MalformedSshfp(data.to_string()))?;
    let fp_type = fp_type
        .parse::<u8>()
        .map_err(|_| MythicBeastsError::MalformedSshfp(data.to_string()))?;
    Ok((algorithm, fp_type, fingerprint.to_string()))
}

fn encode_sshfp(rr: &Rr) -> Result<MythicRecord, MythicBeastsError> {
    let (algorithm, fp_type, fingerprint) = split_sshfp_data(&rr.data)?;
    Ok(MythicRecord {
        rtype: "SSHFP".to_string(),
        host: rr.name.clone(),
        data: fingerprint,
        ttl: rr.ttl,
        sshfp_algorithm: Some(algorithm),
        sshfp_type: Some(fp_type),
        ..MythicRecord::default()
    })
}
