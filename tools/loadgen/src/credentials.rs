//! Credential loader and writers
//!
//! Files are colon-delimited UTF-8 with a header row. Columns are looked up by
//! header name, so column order in the input does not matter. Rows lacking a
//! user id, email or access token are skipped without failing the load.

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::fs::File;
use std::io;
use std::path::Path;
use tracing::{debug, error, info};
use types::credential::{SeedUser, UserCredential, CREDENTIAL_COLUMNS, SEED_COLUMNS};
use types::errors::CredentialError;

const DELIMITER: u8 = b':';

fn open(path: &Path) -> Result<File, CredentialError> {
    File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => CredentialError::NotFound {
            path: path.display().to_string(),
        },
        _ => CredentialError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        },
    })
}

/// Header-indexed rows of a delimited file
struct DelimitedRows {
    headers: StringRecord,
    records: Vec<StringRecord>,
    unreadable: usize,
}

impl DelimitedRows {
    fn read(path: &Path) -> Result<Self, CredentialError> {
        let file = open(path)?;
        let mut reader = ReaderBuilder::new()
            .delimiter(DELIMITER)
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let headers = reader
            .headers()
            .map_err(|e| CredentialError::Read {
                path: path.display().to_string(),
                message: e.to_string(),
            })?
            .clone();
        if headers.iter().all(|h| h.trim().is_empty()) {
            return Err(CredentialError::MissingHeader {
                path: path.display().to_string(),
            });
        }

        let mut records = Vec::new();
        let mut unreadable = 0;
        for result in reader.records() {
            match result {
                Ok(record) => records.push(record),
                Err(e) => {
                    debug!(path = %path.display(), error = %e, "skipping unreadable row");
                    unreadable += 1;
                }
            }
        }

        Ok(Self {
            headers,
            records,
            unreadable,
        })
    }

    fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }
}

fn field<'r>(record: &'r StringRecord, column: Option<usize>) -> Option<&'r str> {
    column.and_then(|idx| record.get(idx))
}

/// Load credentials in file order.
pub fn load_credentials(path: impl AsRef<Path>) -> Result<Vec<UserCredential>, CredentialError> {
    let path = path.as_ref();
    let rows = DelimitedRows::read(path)?;

    let user_id = rows.column("user_id");
    let user_email = rows.column("user_email");
    let access_token = rows.column("access_token");
    let refresh_token = rows.column("refresh_token");

    let users: Vec<UserCredential> = rows
        .records
        .iter()
        .filter_map(|record| {
            UserCredential::from_fields(
                field(record, user_id),
                field(record, user_email),
                field(record, access_token),
                field(record, refresh_token),
            )
        })
        .collect();

    info!(
        path = %path.display(),
        loaded = users.len(),
        skipped = rows.records.len() - users.len() + rows.unreadable,
        "loaded credentials"
    );
    Ok(users)
}

/// Load credentials, reporting any error and returning an empty list instead.
pub fn load_credentials_or_empty(path: impl AsRef<Path>) -> Vec<UserCredential> {
    match load_credentials(path) {
        Ok(users) => users,
        Err(e) => {
            error!(error = %e, "could not load credentials");
            Vec::new()
        }
    }
}

/// Write credentials with the `user_email:user_id:access_token:refresh_token` header.
pub fn write_credentials(path: impl AsRef<Path>, users: &[UserCredential]) -> Result<(), CredentialError> {
    let path = path.as_ref();
    let write_err = |e: csv::Error| CredentialError::Write {
        path: path.display().to_string(),
        message: e.to_string(),
    };

    let mut writer = WriterBuilder::new()
        .delimiter(DELIMITER)
        .from_path(path)
        .map_err(write_err)?;
    writer.write_record(CREDENTIAL_COLUMNS).map_err(write_err)?;
    for user in users {
        writer
            .write_record([
                user.user_email.as_str(),
                user.user_id.as_str(),
                user.access_token.as_str(),
                user.refresh_token.as_str(),
            ])
            .map_err(write_err)?;
    }
    writer.flush().map_err(|e| CredentialError::Write {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Load seed users (`name:email:password`); rows without an email are skipped.
pub fn load_seed_users(path: impl AsRef<Path>) -> Result<Vec<SeedUser>, CredentialError> {
    let path = path.as_ref();
    let rows = DelimitedRows::read(path)?;

    let name = rows.column("name");
    let email = rows.column("email");
    let password = rows.column("password");

    let users: Vec<SeedUser> = rows
        .records
        .iter()
        .filter_map(|record| {
            let email = field(record, email).unwrap_or("").trim();
            if email.is_empty() {
                return None;
            }
            Some(SeedUser {
                name: field(record, name).unwrap_or("").trim().to_string(),
                email: email.to_string(),
                password: field(record, password).unwrap_or("").trim().to_string(),
            })
        })
        .collect();

    info!(path = %path.display(), loaded = users.len(), "loaded seed users");
    Ok(users)
}

/// Write seed users with the `name:email:password` header.
pub fn write_seed_users(path: impl AsRef<Path>, users: &[SeedUser]) -> Result<(), CredentialError> {
    let path = path.as_ref();
    let write_err = |e: csv::Error| CredentialError::Write {
        path: path.display().to_string(),
        message: e.to_string(),
    };

    let mut writer = WriterBuilder::new()
        .delimiter(DELIMITER)
        .from_path(path)
        .map_err(write_err)?;
    writer.write_record(SEED_COLUMNS).map_err(write_err)?;
    for user in users {
        writer
            .write_record([user.name.as_str(), user.email.as_str(), user.password.as_str()])
            .map_err(write_err)?;
    }
    writer.flush().map_err(|e| CredentialError::Write {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn file_with(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_loads_rows_in_file_order() {
        let file = file_with(
            "user_email:user_id:access_token:refresh_token\n\
             b@x.com:2:tok2:ref2\n\
             a@x.com:1:tok1:\n",
        );
        let users = load_credentials(file.path()).unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].user_id, "2");
        assert_eq!(users[1].user_id, "1");
        assert_eq!(users[1].refresh_token, "");
    }

    #[test]
    fn test_skips_incomplete_rows() {
        let file = file_with(
            "user_email:user_id:access_token:refresh_token\n\
             a@x.com:1:tok1:r\n\
             b@x.com::tok2:r\n\
             c@x.com:3\n\
             :4:tok4:r\n\
             e@x.com:5:  :r\n",
        );
        let users = load_credentials(file.path()).unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].user_email, "a@x.com");
    }

    #[test]
    fn test_missing_refresh_column_is_allowed() {
        let file = file_with("user_id:user_email:access_token\n1:a@x.com:tok\n");
        let users = load_credentials(file.path()).unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].refresh_token, "");
    }

    #[test]
    fn test_duplicate_ids_both_kept() {
        let file = file_with(
            "user_email:user_id:access_token:refresh_token\n\
             a@x.com:1:tok1:\n\
             a@x.com:1:tok2:\n",
        );
        let users = load_credentials(file.path()).unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[1].access_token, "tok2");
    }

    #[test]
    fn test_missing_file_is_reported() {
        let err = load_credentials("/nonexistent/logins_out.csv").unwrap_err();
        assert!(matches!(err, CredentialError::NotFound { .. }));
    }

    #[test]
    fn test_empty_file_has_no_header() {
        let file = file_with("");
        let err = load_credentials(file.path()).unwrap_err();
        assert!(matches!(err, CredentialError::MissingHeader { .. }));
    }

    #[test]
    fn test_header_only_is_empty() {
        let file = file_with("user_email:user_id:access_token:refresh_token\n");
        assert!(load_credentials(file.path()).unwrap().is_empty());
    }

    #[test]
    fn test_write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logins_out.csv");
        let users = vec![
            UserCredential::from_fields(Some("1"), Some("a@x.com"), Some("h.p.s"), Some("r.p.s")).unwrap(),
            UserCredential::from_fields(Some("2"), Some("b@x.com"), Some("h.q.s"), None).unwrap(),
        ];
        write_credentials(&path, &users).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("user_email:user_id:access_token:refresh_token\n"));
        assert!(contents.contains("a@x.com:1:h.p.s:r.p.s\n"));

        assert_eq!(load_credentials(&path).unwrap(), users);
    }

    #[test]
    fn test_seed_users_skip_blank_email() {
        let file = file_with("name:email:password\nJohn Kim:user00001@example.com:abc=\nJane Lee::abc=\n");
        let users = load_seed_users(file.path()).unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].name, "John Kim");
        assert_eq!(users[0].email, "user00001@example.com");
    }

    proptest! {
        #[test]
        fn prop_one_credential_per_well_formed_row(
            rows in proptest::collection::vec(
                ("[a-z0-9]{1,6}", "[a-z]{1,6}@x\\.com", "[A-Za-z0-9_.-]{1,20}", "[A-Za-z0-9]{0,8}"),
                0..30,
            )
        ) {
            let mut contents = String::from("user_email:user_id:access_token:refresh_token\n");
            for (id, email, token, refresh) in &rows {
                contents.push_str(&format!("{}:{}:{}:{}\n", email, id, token, refresh));
                // interleave a malformed row that must be ignored
                contents.push_str(&format!("{}:{}\n", email, id));
            }
            let file = file_with(&contents);

            let users = load_credentials(file.path()).unwrap();
            prop_assert_eq!(users.len(), rows.len());
            for (user, (id, email, token, refresh)) in users.iter().zip(&rows) {
                prop_assert_eq!(&user.user_id, id);
                prop_assert_eq!(&user.user_email, email);
                prop_assert_eq!(&user.access_token, token);
                prop_assert_eq!(&user.refresh_token, refresh);
            }
        }
    }
}
