//! Input records
//!
//! Typed views of the JSON records an archival management system hands to
//! the serializer. Linked records arrive as [`Link`]s whose `_resolved`
//! payload has been filled in upstream. Unknown fields are ignored, and
//! every optional field may be absent.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Reference to another record, optionally with its resolved payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Link<T> {
    /// URI of the linked record
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// The linked record itself
    #[serde(rename = "_resolved", default = "Option::default")]
    pub resolved: Option<T>,
}

impl<T> Link<T> {
    /// Wrap an already-resolved record
    pub fn resolved(record: T) -> Self {
        Self {
            reference: None,
            resolved: Some(record),
        }
    }
}

/// An archival object's link to a physical or digital container
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    /// Instance type enumeration value, e.g. `mixed_materials`
    #[serde(default)]
    pub instance_type: String,
    /// Container levels
    #[serde(default)]
    pub sub_container: Option<SubContainer>,
}

/// Up to three nested container levels
///
/// Level one lives on the top container; levels two and three are present
/// only when their `type_n` field is non-empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubContainer {
    /// Level one
    #[serde(default)]
    pub top_container: Option<Link<TopContainer>>,
    /// Level two type
    #[serde(default)]
    pub type_2: Option<String>,
    /// Level two indicator
    #[serde(default)]
    pub indicator_2: Option<String>,
    /// Level three type
    #[serde(default)]
    pub type_3: Option<String>,
    /// Level three indicator
    #[serde(default)]
    pub indicator_3: Option<String>,
}

impl SubContainer {
    /// Type and indicator of nested level 2 or 3, if that level is present
    pub fn level(&self, n: u8) -> Option<(&str, Option<&str>)> {
        let (container_type, indicator) = match n {
            2 => (&self.type_2, &self.indicator_2),
            3 => (&self.type_3, &self.indicator_3),
            _ => return None,
        };
        container_type
            .as_deref()
            .filter(|t| !t.is_empty())
            .map(|t| (t, indicator.as_deref()))
    }
}

/// Resolved top-level container
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopContainer {
    /// Container type, e.g. `box`
    #[serde(rename = "type", default)]
    pub container_type: Option<String>,
    /// Container indicator, e.g. `1`
    #[serde(default)]
    pub indicator: Option<String>,
    /// Barcode
    #[serde(default)]
    pub barcode: Option<String>,
    /// Collections the container belongs to
    #[serde(default, deserialize_with = "null_as_default")]
    pub collection: Vec<CollectionRef>,
    /// Display string such as `Box 1 [mudd], C0140`
    #[serde(default)]
    pub long_display_string: Option<String>,
    /// Container profile
    #[serde(default)]
    pub container_profile: Option<Link<ContainerProfile>>,
    /// Locations holding the container
    #[serde(default, deserialize_with = "null_as_default")]
    pub container_locations: Vec<ContainerLocation>,
}

/// Collection summary attached to a top container
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionRef {
    /// Collection identifier, e.g. `C0140`
    #[serde(default)]
    pub identifier: Option<String>,
    /// Collection title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_string: Option<String>,
}

/// Resolved container profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerProfile {
    /// Profile URL
    #[serde(default)]
    pub url: Option<String>,
    /// Profile name
    #[serde(default)]
    pub name: Option<String>,
}

/// Container location link
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerLocation {
    /// Free-text location note
    #[serde(default)]
    pub note: Option<String>,
}

/// EAD note kind
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NoteType {
    /// `abstract`
    Abstract,
    /// `accessrestrict`
    Accessrestrict,
    /// `accruals`
    Accruals,
    /// `acqinfo`
    Acqinfo,
    /// `altformavail`
    Altformavail,
    /// `appraisal`
    Appraisal,
    /// `arrangement`
    Arrangement,
    /// `bibliography`
    Bibliography,
    /// `bioghist`
    Bioghist,
    /// `custodhist`
    Custodhist,
    /// `dimensions`
    Dimensions,
    /// `fileplan`
    Fileplan,
    /// `index`
    Index,
    /// `langmaterial`
    Langmaterial,
    /// `legalstatus`
    Legalstatus,
    /// `materialspec`
    Materialspec,
    /// `odd`
    Odd,
    /// `originalsloc`
    Originalsloc,
    /// `otherfindaid`
    Otherfindaid,
    /// `physdesc`
    Physdesc,
    /// `physfacet`
    Physfacet,
    /// `physloc`
    Physloc,
    /// `phystech`
    Phystech,
    /// `prefercite`
    Prefercite,
    /// `processinfo`
    Processinfo,
    /// `relatedmaterial`
    Relatedmaterial,
    /// `scopecontent`
    Scopecontent,
    /// `separatedmaterial`
    Separatedmaterial,
    /// `userestrict`
    Userestrict,
    /// Any other type, rendered as an element of the same name
    Other(String),
}

impl NoteType {
    /// The EAD tag for this note type
    pub fn as_str(&self) -> &str {
        match self {
            Self::Abstract => "abstract",
            Self::Accessrestrict => "accessrestrict",
            Self::Accruals => "accruals",
            Self::Acqinfo => "acqinfo",
            Self::Altformavail => "altformavail",
            Self::Appraisal => "appraisal",
            Self::Arrangement => "arrangement",
            Self::Bibliography => "bibliography",
            Self::Bioghist => "bioghist",
            Self::Custodhist => "custodhist",
            Self::Dimensions => "dimensions",
            Self::Fileplan => "fileplan",
            Self::Index => "index",
            Self::Langmaterial => "langmaterial",
            Self::Legalstatus => "legalstatus",
            Self::Materialspec => "materialspec",
            Self::Odd => "odd",
            Self::Originalsloc => "originalsloc",
            Self::Otherfindaid => "otherfindaid",
            Self::Physdesc => "physdesc",
            Self::Physfacet => "physfacet",
            Self::Physloc => "physloc",
            Self::Phystech => "phystech",
            Self::Prefercite => "prefercite",
            Self::Processinfo => "processinfo",
            Self::Relatedmaterial => "relatedmaterial",
            Self::Scopecontent => "scopecontent",
            Self::Separatedmaterial => "separatedmaterial",
            Self::Userestrict => "userestrict",
            Self::Other(name) => name,
        }
    }
}

impl From<&str> for NoteType {
    fn from(s: &str) -> Self {
        match s {
            "abstract" => Self::Abstract,
            "accessrestrict" => Self::Accessrestrict,
            "accruals" => Self::Accruals,
            "acqinfo" => Self::Acqinfo,
            "altformavail" => Self::Altformavail,
            "appraisal" => Self::Appraisal,
            "arrangement" => Self::Arrangement,
            "bibliography" => Self::Bibliography,
            "bioghist" => Self::Bioghist,
            "custodhist" => Self::Custodhist,
            "dimensions" => Self::Dimensions,
            "fileplan" => Self::Fileplan,
            "index" => Self::Index,
            "langmaterial" => Self::Langmaterial,
            "legalstatus" => Self::Legalstatus,
            "materialspec" => Self::Materialspec,
            "odd" => Self::Odd,
            "originalsloc" => Self::Originalsloc,
            "otherfindaid" => Self::Otherfindaid,
            "physdesc" => Self::Physdesc,
            "physfacet" => Self::Physfacet,
            "physloc" => Self::Physloc,
            "phystech" => Self::Phystech,
            "prefercite" => Self::Prefercite,
            "processinfo" => Self::Processinfo,
            "relatedmaterial" => Self::Relatedmaterial,
            "scopecontent" => Self::Scopecontent,
            "separatedmaterial" => Self::Separatedmaterial,
            "userestrict" => Self::Userestrict,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for NoteType {
    fn from(s: String) -> Self {
        NoteType::from(s.as_str())
    }
}

impl From<NoteType> for String {
    fn from(t: NoteType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for NoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set of note types selecting a dispatch path
pub type NoteTypeSet = HashSet<NoteType>;

/// Local access restriction codes attached to a note
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RightsRestriction {
    /// Restriction type codes, first one wins
    #[serde(default, deserialize_with = "null_as_default")]
    pub local_access_restriction_type: Vec<String>,
}

/// A note attached to a description or an agent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// Record kind, e.g. `note_multipart` or `note_bioghist`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jsonmodel_type: Option<String>,
    /// Note type
    #[serde(rename = "type", default)]
    pub note_type: Option<NoteType>,
    /// Publish flag; unset counts as published
    #[serde(default)]
    pub publish: Option<bool>,
    /// Staff-only note, never exported by the non-DID path
    #[serde(default, deserialize_with = "null_as_default")]
    pub internal: bool,
    /// Stable id used for the element `id`
    #[serde(default)]
    pub persistent_id: Option<String>,
    /// Label, used as head text
    #[serde(default)]
    pub label: Option<String>,
    /// Text content, possibly with markup
    #[serde(default, deserialize_with = "text_or_parts")]
    pub content: Option<String>,
    /// Structured sub-parts
    #[serde(default, deserialize_with = "null_as_default")]
    pub subnotes: Vec<Subnote>,
    /// Rights restriction
    #[serde(default)]
    pub rights_restriction: Option<RightsRestriction>,
}

impl Note {
    /// Effective note type: `type`, else `jsonmodel_type` without `note_`
    pub fn kind(&self) -> Option<NoteType> {
        if let Some(t) = &self.note_type {
            return Some(t.clone());
        }
        self.jsonmodel_type
            .as_deref()
            .and_then(|j| j.strip_prefix("note_"))
            .filter(|t| !t.is_empty())
            .map(NoteType::from)
    }

    /// Explicitly unpublished (`publish: false`)
    pub fn is_unpublished(&self) -> bool {
        self.publish == Some(false)
    }

    /// First local access restriction code, if any
    pub fn rights_restriction_type(&self) -> Option<&str> {
        self.rights_restriction
            .as_ref()?
            .local_access_restriction_type
            .first()
            .map(|s| s.as_str())
            .filter(|s| !s.is_empty())
    }

    /// Note text with the content of `note_text` subnotes appended
    ///
    /// Parts are joined by blank lines. Unpublished subnotes are only
    /// included when `include_unpublished` is set.
    pub fn extract_text(&self, include_unpublished: bool) -> String {
        let mut parts: Vec<&str> = self.content.iter().map(|c| c.as_str()).collect();
        for subnote in &self.subnotes {
            if let Subnote::Text { content: Some(content), .. } = subnote {
                if include_unpublished || !subnote.is_unpublished() {
                    parts.push(content);
                }
            }
        }
        parts.retain(|p| !p.trim().is_empty());
        parts.join("\n\n")
    }
}

/// Structured part of a multipart note
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "jsonmodel_type")]
pub enum Subnote {
    /// Free text
    #[serde(rename = "note_text")]
    Text {
        /// Text content
        #[serde(default, deserialize_with = "text_or_parts")]
        content: Option<String>,
        /// Publish flag
        #[serde(default)]
        publish: Option<bool>,
    },
    /// Chronology of dated events
    #[serde(rename = "note_chronology")]
    Chronology {
        /// List title
        #[serde(default)]
        title: Option<String>,
        /// Dated entries
        #[serde(default, deserialize_with = "null_as_default")]
        items: Vec<ChronologyItem>,
        /// Publish flag
        #[serde(default)]
        publish: Option<bool>,
    },
    /// Ordered list
    #[serde(rename = "note_orderedlist")]
    OrderedList {
        /// List title
        #[serde(default)]
        title: Option<String>,
        /// Numeration style, e.g. `arabic`
        #[serde(default)]
        enumeration: Option<String>,
        /// List items
        #[serde(default, deserialize_with = "null_as_default")]
        items: Vec<String>,
        /// Publish flag
        #[serde(default)]
        publish: Option<bool>,
    },
    /// Definition list
    #[serde(rename = "note_definedlist")]
    DefinedList {
        /// List title
        #[serde(default)]
        title: Option<String>,
        /// Label/value pairs
        #[serde(default, deserialize_with = "null_as_default")]
        items: Vec<DefinedItem>,
        /// Publish flag
        #[serde(default)]
        publish: Option<bool>,
    },
    /// Subnote kinds this serializer does not render
    #[serde(other)]
    Unsupported,
}

impl Subnote {
    /// Explicitly unpublished (`publish: false`)
    pub fn is_unpublished(&self) -> bool {
        match self {
            Subnote::Text { publish, .. }
            | Subnote::Chronology { publish, .. }
            | Subnote::OrderedList { publish, .. }
            | Subnote::DefinedList { publish, .. } => *publish == Some(false),
            Subnote::Unsupported => false,
        }
    }
}

/// Chronology entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChronologyItem {
    /// Date expression
    #[serde(default)]
    pub event_date: Option<String>,
    /// Events on that date
    #[serde(default, deserialize_with = "null_as_default")]
    pub events: Vec<String>,
}

/// Definition list entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefinedItem {
    /// Term
    #[serde(default)]
    pub label: Option<String>,
    /// Definition
    #[serde(default)]
    pub value: Option<String>,
}

/// Agent name form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentName {
    /// Sortable form of the name
    #[serde(default)]
    pub sort_name: Option<String>,
}

/// Resolved creator or source agent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    /// Publish flag; only `true` counts as published
    #[serde(default)]
    pub publish: Option<bool>,
    /// Name forms in display order
    #[serde(default, deserialize_with = "null_as_default")]
    pub names: Vec<AgentName>,
    /// Notes about the agent
    #[serde(default, deserialize_with = "null_as_default")]
    pub notes: Vec<Note>,
}

impl Agent {
    /// Non-empty sort names in name order
    pub fn sort_names(&self) -> Vec<String> {
        self.names
            .iter()
            .filter_map(|n| n.sort_name.as_deref())
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// The described entity whose notes are being exported
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DescriptionRecord {
    /// Notes attached directly to the record
    #[serde(default, deserialize_with = "null_as_default")]
    pub notes: Vec<Note>,
    /// Linked creator and source agents
    #[serde(default, deserialize_with = "null_as_default")]
    pub creators_and_sources: Vec<Link<Agent>>,
    /// Types exported by the DID path; policy default when absent
    #[serde(default)]
    pub did_note_types: Option<NoteTypeSet>,
    /// Types exported by the non-DID path; policy default when absent
    #[serde(default)]
    pub archdesc_note_types: Option<NoteTypeSet>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrParts {
    Text(String),
    Parts(Vec<Option<String>>),
}

fn text_or_parts<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<TextOrParts>::deserialize(deserializer)? {
        None => None,
        Some(TextOrParts::Text(text)) => Some(text),
        Some(TextOrParts::Parts(parts)) => {
            let parts: Vec<String> = parts.into_iter().flatten().collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join("\n\n"))
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_note_type_round_trip_through_strings() {
        assert_eq!(NoteType::from("bioghist"), NoteType::Bioghist);
        assert_eq!(NoteType::from("custom"), NoteType::Other("custom".to_string()));
        assert_eq!(String::from(NoteType::Legalstatus), "legalstatus");
    }

    #[test]
    fn test_note_kind_from_jsonmodel_type() {
        let note: Note = serde_json::from_value(json!({
            "jsonmodel_type": "note_bioghist",
            "publish": true
        }))
        .unwrap();
        assert_eq!(note.kind(), Some(NoteType::Bioghist));

        let typed: Note = serde_json::from_value(json!({
            "jsonmodel_type": "note_multipart",
            "type": "scopecontent"
        }))
        .unwrap();
        assert_eq!(typed.kind(), Some(NoteType::Scopecontent));
    }

    #[test]
    fn test_content_accepts_string_or_array() {
        let single: Note = serde_json::from_value(json!({ "content": "one" })).unwrap();
        assert_eq!(single.content.as_deref(), Some("one"));

        let parts: Note = serde_json::from_value(json!({ "content": ["one", "two"] })).unwrap();
        assert_eq!(parts.content.as_deref(), Some("one\n\ntwo"));

        let empty: Note = serde_json::from_value(json!({ "content": [] })).unwrap();
        assert_eq!(empty.content, None);
    }

    #[test]
    fn test_null_internal_is_false() {
        let note: Note = serde_json::from_value(json!({
            "type": "odd",
            "internal": null,
            "subnotes": null
        }))
        .unwrap();
        assert!(!note.internal);
        assert!(note.subnotes.is_empty());
    }

    #[test]
    fn test_publish_unset_is_not_unpublished() {
        let note = Note::default();
        assert!(!note.is_unpublished());
        assert!(Note { publish: Some(false), ..Note::default() }.is_unpublished());
    }

    #[test]
    fn test_extract_text_joins_text_subnotes() {
        let note: Note = serde_json::from_value(json!({
            "jsonmodel_type": "note_multipart",
            "type": "dimensions",
            "subnotes": [
                { "jsonmodel_type": "note_text", "content": "2 boxes" },
                { "jsonmodel_type": "note_text", "content": "hidden", "publish": false },
                { "jsonmodel_type": "note_text", "content": "1 folder" }
            ]
        }))
        .unwrap();

        assert_eq!(note.extract_text(false), "2 boxes\n\n1 folder");
        assert_eq!(note.extract_text(true), "2 boxes\n\nhidden\n\n1 folder");
    }

    #[test]
    fn test_subnote_variants() {
        let subnotes: Vec<Subnote> = serde_json::from_value(json!([
            { "jsonmodel_type": "note_text", "content": "x" },
            { "jsonmodel_type": "note_orderedlist", "enumeration": "arabic", "items": ["a", "b"] },
            { "jsonmodel_type": "note_outline", "levels": [] }
        ]))
        .unwrap();

        assert!(matches!(subnotes[0], Subnote::Text { .. }));
        assert!(matches!(&subnotes[1], Subnote::OrderedList { items, .. } if items.len() == 2));
        assert_eq!(subnotes[2], Subnote::Unsupported);
    }

    #[test]
    fn test_sub_container_levels() {
        let sub = SubContainer {
            type_2: Some("folder".to_string()),
            indicator_2: Some("3".to_string()),
            type_3: Some(String::new()),
            ..SubContainer::default()
        };
        assert_eq!(sub.level(2), Some(("folder", Some("3"))));
        assert_eq!(sub.level(3), None);
        assert_eq!(sub.level(4), None);
    }

    #[test]
    fn test_top_container_from_json() {
        let top: TopContainer = serde_json::from_value(json!({
            "type": "box",
            "indicator": "1",
            "collection": null,
            "container_profile": { "ref": "/container_profiles/1", "_resolved": { "name": "Standard" } }
        }))
        .unwrap();

        assert_eq!(top.container_type.as_deref(), Some("box"));
        assert!(top.collection.is_empty());
        let profile = top.container_profile.unwrap().resolved.unwrap();
        assert_eq!(profile.name.as_deref(), Some("Standard"));
    }

    #[test]
    fn test_agent_sort_names_keep_order() {
        let agent: Agent = serde_json::from_value(json!({
            "publish": true,
            "names": [{ "sort_name": "Smith, Jane" }, {}, { "sort_name": "Doe, J." }]
        }))
        .unwrap();
        assert_eq!(agent.sort_names(), vec!["Smith, Jane", "Doe, J."]);
    }
}
