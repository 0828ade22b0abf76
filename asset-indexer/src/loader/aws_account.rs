//! AWS account reference normalization.

use lazy_static::lazy_static;
use regex::Regex;

use crate::errors::IngestError;

lazy_static! {
    static ref ACCOUNT_ID_REGEXP: Regex = Regex::new(r"^[0-9]{12}$").unwrap();
    static ref ACCOUNT_ARN_REGEXP: Regex = Regex::new(r"^arn:aws:iam::[0-9]{12}:root$").unwrap();
}

/// Asset type of the synthetic AWS account assets.
pub const AWS_ACCOUNT_ASSET_TYPE: &str = "AWSAccount";

/// Normalize an account annotation into the `arn:aws:iam::<id>:root` form.
///
/// Accepts a bare 12-digit account ID or an account root ARN.
pub fn normalize_aws_account_id(account: &str) -> Result<String, IngestError> {
    if ACCOUNT_ARN_REGEXP.is_match(account) {
        return Ok(account.to_string());
    }
    if ACCOUNT_ID_REGEXP.is_match(account) {
        return Ok(format!("arn:aws:iam::{}:root", account));
    }
    Err(IngestError::InvalidAwsAccount(account.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_aws_account_id() {
        let cases = [
            ("arn:aws:iam::123456789012:root", Some("arn:aws:iam::123456789012:root")),
            ("123456789012", Some("arn:aws:iam::123456789012:root")),
            ("arn:aws:iam::12345abc9012:root", None),
            ("12345abc9012", None),
            ("1234567890123", None),
            ("arn:aws:iam::123456789012:user/admin", None),
            (" 123456789012", None),
            ("", None),
        ];

        for (input, expected) in cases {
            let result = normalize_aws_account_id(input);
            match expected {
                Some(want) => assert_eq!(result.unwrap(), want, "input {input:?}"),
                None => assert!(
                    matches!(result, Err(IngestError::InvalidAwsAccount(_))),
                    "input {input:?}"
                ),
            }
        }
    }
}
