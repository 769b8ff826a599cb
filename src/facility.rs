//! Emergency facility reference data.
//!
//! Facilities are static records. Nothing here is derived from the visitor's
//! location; the assistant lists the same entries wherever the visitor is,
//! filtered only by who needs help.

use serde::{Deserialize, Serialize};

use crate::assistant::Recipient;

/// Facilities whose type contains this marker treat animals.
pub const VETERINARY_MARKER: &str = "Veterinary";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facility {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Display distance, e.g. "0.8 km"
    pub distance: String,
    #[serde(default)]
    pub is_24x7: bool,
    pub phone: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialties: Option<Vec<String>>,
}

impl Facility {
    pub fn is_veterinary(&self) -> bool {
        self.kind.contains(VETERINARY_MARKER)
    }

    /// Whether this facility treats the given recipient.
    pub fn serves(&self, recipient: Recipient) -> bool {
        match recipient {
            Recipient::Animal => self.is_veterinary(),
            Recipient::Human => !self.is_veterinary(),
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn facility(
    id: &str,
    name: &str,
    kind: &str,
    distance: &str,
    is_24x7: bool,
    phone: &str,
    address: &str,
    specialties: &[&str],
) -> Facility {
    Facility {
        id: id.to_string(),
        name: name.to_string(),
        kind: kind.to_string(),
        distance: distance.to_string(),
        is_24x7,
        phone: phone.to_string(),
        address: address.to_string(),
        specialties: Some(specialties.iter().map(|s| s.to_string()).collect()),
    }
}

/// The three demo facilities shipped with the site.
pub fn builtin_facilities() -> Vec<Facility> {
    vec![
        facility(
            "1",
            "City General Hospital",
            "Emergency Department",
            "0.8 km",
            true,
            "+1-555-0123",
            "123 Main Street, Downtown",
            &["Emergency Medicine", "Trauma", "Cardiology"],
        ),
        facility(
            "2",
            "Rapid Care Clinic",
            "Urgent Care",
            "1.2 km",
            false,
            "+1-555-0456",
            "456 Oak Avenue, Midtown",
            &["General Medicine", "Minor Injuries"],
        ),
        facility(
            "3",
            "Pet Emergency Vet",
            "Veterinary Hospital",
            "2.1 km",
            true,
            "+1-555-0789",
            "789 Pet Lane, Suburbs",
            &["Emergency Veterinary", "Surgery", "Critical Care"],
        ),
    ]
}

/// Immutable list of facilities shared by all requests.
#[derive(Debug, Clone)]
pub struct FacilityDirectory {
    facilities: Vec<Facility>,
}

impl Default for FacilityDirectory {
    fn default() -> Self {
        Self::new(builtin_facilities())
    }
}

impl FacilityDirectory {
    pub fn new(facilities: Vec<Facility>) -> Self {
        Self { facilities }
    }

    /// Use the configured facilities, or the built-in list when none are configured.
    pub fn from_config(configured: &[Facility]) -> Self {
        if configured.is_empty() {
            Self::default()
        } else {
            Self::new(configured.to_vec())
        }
    }

    pub fn all(&self) -> &[Facility] {
        &self.facilities
    }

    pub fn len(&self) -> usize {
        self.facilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facilities.is_empty()
    }

    /// Facilities for the recipient, in directory order.
    pub fn for_recipient(&self, recipient: Recipient) -> Vec<&Facility> {
        self.facilities
            .iter()
            .filter(|f| f.serves(recipient))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&Facility]) -> Vec<String> {
        list.iter().map(|f| f.name.clone()).collect()
    }

    #[test]
    fn animal_gets_only_the_vet() {
        let dir = FacilityDirectory::default();
        let found = dir.for_recipient(Recipient::Animal);
        assert_eq!(names(&found), vec!["Pet Emergency Vet"]);
        assert!(found.iter().all(|f| f.kind.contains("Veterinary")));
    }

    #[test]
    fn human_gets_hospital_and_clinic() {
        let dir = FacilityDirectory::default();
        let found = dir.for_recipient(Recipient::Human);
        assert_eq!(
            names(&found),
            vec!["City General Hospital", "Rapid Care Clinic"]
        );
        assert!(found.iter().all(|f| !f.kind.contains("Veterinary")));
    }

    #[test]
    fn filter_partitions_the_directory() {
        let dir = FacilityDirectory::default();
        let humans = dir.for_recipient(Recipient::Human).len();
        let animals = dir.for_recipient(Recipient::Animal).len();
        assert_eq!(humans + animals, dir.len());
    }

    #[test]
    fn marker_is_matched_anywhere_in_type() {
        let mut f = builtin_facilities().remove(0);
        f.kind = "Mobile Veterinary Unit".to_string();
        assert!(f.serves(Recipient::Animal));
        assert!(!f.serves(Recipient::Human));

        // Case-sensitive, as the marker is a fixed label
        f.kind = "veterinary clinic".to_string();
        assert!(f.serves(Recipient::Human));
    }

    #[test]
    fn empty_config_falls_back_to_builtin() {
        let dir = FacilityDirectory::from_config(&[]);
        assert_eq!(dir.all(), builtin_facilities().as_slice());
    }

    #[test]
    fn configured_list_replaces_builtin() {
        let only_vet = vec![builtin_facilities().remove(2)];
        let dir = FacilityDirectory::from_config(&only_vet);
        assert_eq!(dir.len(), 1);
        assert!(dir.for_recipient(Recipient::Human).is_empty());
    }

    #[test]
    fn serializes_type_field() {
        let json = serde_json::to_value(&builtin_facilities()[1]).unwrap();
        assert_eq!(json["type"], "Urgent Care");
        assert_eq!(json["is_24x7"], false);
        assert_eq!(json["specialties"][1], "Minor Injuries");
    }
}
