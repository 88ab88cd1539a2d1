//! Demo vault used by the `sample` command.

use vaultedit_common::GroupId;
use vaultedit_facade::{
    Entry, EntryType, FacadeFactory, FieldValueType, Group, SequentialFactory, VaultFacade,
};

fn set_property(
    factory: &dyn FacadeFactory,
    entry: &mut Entry,
    property: &str,
    value: &str,
    value_type: FieldValueType,
) {
    let index = match entry
        .fields
        .iter()
        .position(|field| field.property_name == property)
    {
        Some(index) => index,
        None => {
            entry.fields.push(factory.create_field(property, value_type));
            entry.fields.len() - 1
        }
    };
    let field = &mut entry.fields[index];
    field.set_value(value);
    field.value_type = value_type;
}

fn add_group(
    vault: &mut VaultFacade,
    factory: &dyn FacadeFactory,
    parent: Option<&GroupId>,
    title: &str,
) -> GroupId {
    let mut group: Group = factory.create_group(parent);
    group.title = title.to_string();
    let id = group.id.clone();
    vault.groups.push(group);
    id
}

fn add_entry(
    vault: &mut VaultFacade,
    factory: &dyn FacadeFactory,
    parent: &GroupId,
    entry_type: EntryType,
    properties: &[(&str, &str, FieldValueType)],
) {
    let mut entry = factory.create_entry(entry_type, parent);
    for (property, value, value_type) in properties {
        set_property(factory, &mut entry, property, value, *value_type);
    }
    vault.entries.push(entry);
}

/// Build the demo vault with stable, counter-based IDs for groups, entries and fields.
pub fn sample_vault() -> VaultFacade {
    use FieldValueType::{Note, Otp, Password, Text};

    let factory = SequentialFactory::new("sample-");
    let mut vault = VaultFacade::new();

    let general = add_group(&mut vault, &factory, None, "General");
    add_entry(
        &mut vault,
        &factory,
        &general,
        EntryType::Website,
        &[
            ("title", "Home wi-fi", Text),
            ("username", "somehow", Text),
            ("password", "x8v@mId01", Password),
            ("url", "https://google.com", Text),
        ],
    );
    add_entry(
        &mut vault,
        &factory,
        &general,
        EntryType::Website,
        &[
            ("title", "Social website", Text),
            ("username", "user@test.com", Text),
            ("password", "vdfs867sd5", Password),
            (
                "otpURI",
                "otpauth://totp/ACME:AzureDiamond?issuer=ACME&secret=NB2W45DFOIZA&algorithm=SHA1&digits=6&period=30",
                Otp,
            ),
            ("url", "https://site.com", Text),
            ("Recovery pin", "1234", Text),
        ],
    );
    add_entry(
        &mut vault,
        &factory,
        &general,
        EntryType::Login,
        &[
            ("title", "Gate lock combination", Text),
            ("username", "test", Text),
            ("password", "4812", Password),
        ],
    );

    let notes = add_group(&mut vault, &factory, None, "Notes");
    add_entry(
        &mut vault,
        &factory,
        &notes,
        EntryType::Note,
        &[
            ("title", "Meeting notes 2019-02-01", Text),
            (
                "note",
                "Team meeting\n\n - Cool item created\n - Bug found\n\nAll done.\n",
                Note,
            ),
        ],
    );
    add_group(&mut vault, &factory, Some(&notes), "Meetings");
    let personal = add_group(&mut vault, &factory, Some(&notes), "Personal");
    add_group(&mut vault, &factory, Some(&personal), "Test");

    vault
}

#[cfg(test)]
mod tests {
    use super::*;
    use vaultedit_facade::{Blake2Fingerprinter, Fingerprinter};

    #[test]
    fn test_sample_is_valid() {
        let vault = sample_vault();
        assert!(vault.validate().is_ok());
        assert_eq!(vault.groups.len(), 5);
        assert_eq!(vault.entries.len(), 4);
        assert_eq!(vault.groups[0].title, "General");
    }

    #[test]
    fn test_sample_is_reproducible() {
        let a = sample_vault();
        let b = sample_vault();
        assert_eq!(a, b);
        assert_eq!(
            Blake2Fingerprinter.fingerprint(&a),
            Blake2Fingerprinter.fingerprint(&b)
        );
    }

    #[test]
    fn test_otp_field_is_tagged() {
        let vault = sample_vault();
        let social = &vault.entries[1];
        let otp = social
            .fields
            .iter()
            .find(|field| field.property_name == "otpURI")
            .unwrap();
        assert_eq!(otp.value_type, FieldValueType::Otp);
        assert_eq!(social.title(), "Social website");
    }
}
