use crate::types::Person;
use indexmap::IndexMap;

/// Persons keyed by province, in first-seen province order
pub type ProvinceGroups = IndexMap<String, Vec<Person>>;

/// Groups persons by their province.
///
/// Persons without a province are left out. Input order is preserved within
/// each group.
pub fn group_by_province(persons: &[Person]) -> ProvinceGroups {
    persons.iter().fold(ProvinceGroups::new(), |mut groups, person| {
        if let Some(province) = person.province() {
            groups
                .entry(province.to_string())
                .or_default()
                .push(person.clone());
        }
        groups
    })
}

/// Number of members per province
pub fn member_counts(groups: &ProvinceGroups) -> IndexMap<String, usize> {
    groups
        .iter()
        .map(|(province, members)| (province.clone(), members.len()))
        .collect()
}
