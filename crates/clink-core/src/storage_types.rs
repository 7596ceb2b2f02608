use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Storage backend types
///
/// Selects which backend constructor a configured storage instance uses.
/// Parsed from the `type` field of the storage configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum StorageType {
    #[serde(rename = "bypass")]
    Bypass,
    #[serde(rename = "local")]
    Local,
    #[serde(rename = "s3")]
    S3,
    #[serde(rename = "cf")]
    CloudFront,
    #[serde(rename = "cfs")]
    CloudFrontSigned,
    #[serde(rename = "yos")]
    Yos,
}

impl FromStr for StorageType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bypass" => Ok(StorageType::Bypass),
            "local" => Ok(StorageType::Local),
            "s3" => Ok(StorageType::S3),
            "cf" => Ok(StorageType::CloudFront),
            "cfs" => Ok(StorageType::CloudFrontSigned),
            "yos" => Ok(StorageType::Yos),
            _ => Err(anyhow::anyhow!("Invalid storage type: {}", s)),
        }
    }
}

impl Display for StorageType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StorageType::Bypass => write!(f, "bypass"),
            StorageType::Local => write!(f, "local"),
            StorageType::S3 => write!(f, "s3"),
            StorageType::CloudFront => write!(f, "cf"),
            StorageType::CloudFrontSigned => write!(f, "cfs"),
            StorageType::Yos => write!(f, "yos"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_storage_type() {
        assert_eq!("local".parse::<StorageType>().unwrap(), StorageType::Local);
        assert_eq!("S3".parse::<StorageType>().unwrap(), StorageType::S3);
        assert_eq!("cfs".parse::<StorageType>().unwrap(), StorageType::CloudFrontSigned);
        assert!("nfs".parse::<StorageType>().is_err());
    }

    #[test]
    fn test_display_matches_parse() {
        for ty in [
            StorageType::Bypass,
            StorageType::Local,
            StorageType::S3,
            StorageType::CloudFront,
            StorageType::CloudFrontSigned,
            StorageType::Yos,
        ] {
            assert_eq!(ty.to_string().parse::<StorageType>().unwrap(), ty);
        }
    }
}
