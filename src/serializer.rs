//! EAD serializer for containers and notes
//!
//! [`EadSerializer`] appends EAD elements for one record to a parent
//! element. It owns only immutable configuration plus an id generator, so a
//! single instance can serve concurrent exports of different records.

use crate::config::ExportOptions;
use crate::error::{MissingFieldError, Result};
use crate::i18n::{Translate, Translations, INSTANCE_TYPE_KEY, NOTE_TYPE_KEY};
use crate::ids::{IdGenerator, IdPrefix, RandomHexIds};
use crate::mixed::{extract_head_text, sanitize_mixed_content};
use crate::model::{
    DescriptionRecord, Instance, Note, NoteType, NoteTypeSet, Subnote, TopContainer,
};
use crate::names::validate_element_name;
use crate::xml::{XmlElement, XmlWriter};

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn set_audience(element: &mut XmlElement, unpublished: bool) {
    if unpublished {
        element.set_attribute("audience", "internal");
    }
}

/// Serializes containers and notes of description records into EAD
pub struct EadSerializer {
    options: ExportOptions,
    prefix: IdPrefix,
    ids: Box<dyn IdGenerator>,
    translations: Box<dyn Translate>,
}

impl std::fmt::Debug for EadSerializer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EadSerializer")
            .field("options", &self.options)
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

impl Default for EadSerializer {
    fn default() -> Self {
        Self::new(ExportOptions::default())
    }
}

impl EadSerializer {
    /// Create a serializer with English labels and random ids
    ///
    /// A translations file named in the options is not read; use
    /// [`EadSerializer::from_options`] for that.
    pub fn new(options: ExportOptions) -> Self {
        Self {
            prefix: IdPrefix::new(options.id_prefix.clone()),
            options,
            ids: Box::new(RandomHexIds),
            translations: Box::new(Translations::english()),
        }
    }

    /// Create a serializer, loading the translations file named in the options
    pub fn from_options(options: ExportOptions) -> Result<Self> {
        let mut translations = Translations::english();
        if let Some(path) = &options.translations {
            translations.merge_json_file(path)?;
        }
        Ok(Self::new(options).with_translations(translations))
    }

    /// Replace the id generator
    pub fn with_id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    /// Replace the label lookup
    pub fn with_translations(mut self, translations: impl Translate + 'static) -> Self {
        self.translations = Box::new(translations);
        self
    }

    /// Get the options
    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Writer configured with the output options
    pub fn writer(&self) -> XmlWriter {
        XmlWriter::new().with_indent(self.options.indent)
    }

    /// Write the children of `parent` as a fragment
    pub fn render_fragment(&self, parent: &XmlElement) -> Result<String> {
        self.writer().write_nodes(&parent.children)
    }

    fn include_unpublished(&self) -> bool {
        self.options.include_unpublished
    }

    fn generate_id(&self) -> String {
        let raw = self.ids.generate();
        self.prefix.apply(Some(&raw)).unwrap_or(raw)
    }

    // ------------------------------------------------------------------
    // Containers
    // ------------------------------------------------------------------

    /// Append the `container` elements of an instance to `parent`
    ///
    /// Emits the top container followed by up to two nested levels, each
    /// nested element pointing at the previous one through `parent`.
    pub fn serialize_container(&self, instance: &Instance, parent: &mut XmlElement) -> Result<()> {
        let sub = instance
            .sub_container
            .as_ref()
            .ok_or_else(|| MissingFieldError::new("sub_container").in_record("instance"))?;
        let top = sub
            .top_container
            .as_ref()
            .and_then(|link| link.resolved.as_ref())
            .ok_or_else(|| {
                MissingFieldError::new("sub_container.top_container._resolved")
                    .in_record("instance")
            })?;

        let mut last_id = self.generate_id();
        let mut container = XmlElement::new("container").with_attribute("id", last_id.as_str());

        if let Some(container_type) = non_empty(top.container_type.as_deref()) {
            container.set_attribute("type", container_type);
        }
        container.set_attribute("label", self.container_label(instance, top));
        if let Some(code) = location_code(top) {
            container.set_attribute("altrender", code);
        }
        if let Some(analog) = encoding_analog(top) {
            container.set_attribute("encodinganalog", analog);
        }
        if let Some(note) = top
            .container_locations
            .first()
            .and_then(|location| non_empty(location.note.as_deref()))
        {
            container.set_attribute("note", note);
        }
        if let Some(indicator) = top.indicator.as_deref() {
            sanitize_mixed_content(indicator, &mut container, false);
        }
        parent.push_element(container);

        for n in [2, 3] {
            if let Some((container_type, indicator)) = sub.level(n) {
                let id = self.generate_id();
                let mut nested = XmlElement::new("container")
                    .with_attribute("id", id.as_str())
                    .with_attribute("parent", last_id.as_str())
                    .with_attribute("type", container_type);
                if let Some(indicator) = indicator {
                    sanitize_mixed_content(indicator, &mut nested, false);
                }
                parent.push_element(nested);
                last_id = id;
            }
        }

        Ok(())
    }

    fn container_label(&self, instance: &Instance, top: &TopContainer) -> String {
        let key = format!("{}.{}", INSTANCE_TYPE_KEY, instance.instance_type);
        let mut label = self.translations.translate(&key, &instance.instance_type);
        if let Some(barcode) = non_empty(top.barcode.as_deref()) {
            label.push_str(&format!(" [{}]", barcode));
        }
        label
    }

    // ------------------------------------------------------------------
    // Note content
    // ------------------------------------------------------------------

    /// Append the element for one note to `parent`
    ///
    /// `personal_names` become leading `<note label="personal-name">`
    /// children; they are only passed for agent biographical notes.
    pub fn serialize_note_content(
        &self,
        note: &Note,
        parent: &mut XmlElement,
        personal_names: &[String],
    ) {
        if note.is_unpublished() && !self.include_unpublished() {
            log::debug!("Skipping unpublished note {:?}", note.persistent_id);
            return;
        }
        let kind = match note.kind() {
            Some(kind) => kind,
            None => {
                log::debug!("Skipping note without a type {:?}", note.persistent_id);
                return;
            }
        };
        if let Err(e) = validate_element_name(kind.as_str()) {
            log::warn!("Skipping note {:?}: {}", note.persistent_id, e);
            return;
        }

        let unpublished = note.is_unpublished();
        let id = self.prefix.apply(note.persistent_id.as_deref());
        let label = non_empty(note.label.as_deref());

        let head_default = match label {
            Some(label) => label.to_string(),
            None => self
                .translations
                .translate(&format!("{}.{}", NOTE_TYPE_KEY, kind), kind.as_str()),
        };
        let (content, head_text) = match note.content.as_deref() {
            Some(content) => extract_head_text(content, &head_default),
            None => (String::new(), head_default),
        };

        let mut element = XmlElement::new(kind.as_str());
        if let Some(id) = id {
            element.set_attribute("id", id);
        }

        match kind {
            NoteType::Dimensions | NoteType::Physfacet => {
                if let Some(label) = label {
                    element.set_attribute("label", label);
                }
                self.fill_note(&mut element, &kind, note, &content, &head_text, personal_names);
                let mut physdesc = XmlElement::new("physdesc");
                set_audience(&mut physdesc, unpublished);
                physdesc.push_element(element);
                parent.push_element(physdesc);
            }
            NoteType::Physdesc => {
                if let Some(label) = label {
                    element.set_attribute("label", label);
                }
                set_audience(&mut element, unpublished);
                self.fill_note(&mut element, &kind, note, &content, &head_text, personal_names);
                parent.push_element(element);
            }
            _ => {
                set_audience(&mut element, unpublished);
                self.fill_note(&mut element, &kind, note, &content, &head_text, personal_names);
                parent.push_element(element);
            }
        }
    }

    fn fill_note(
        &self,
        element: &mut XmlElement,
        kind: &NoteType,
        note: &Note,
        content: &str,
        head_text: &str,
        personal_names: &[String],
    ) {
        if let Some(restriction) = note.rights_restriction_type() {
            element.set_attribute("rights-restriction", restriction);
        }

        for name in personal_names {
            element.push_element(
                XmlElement::new("note")
                    .with_attribute("label", "personal-name")
                    .with_text(name.as_str()),
            );
        }

        let policy = &self.options.policy;
        if !policy.is_headless(kind, Some(content)) {
            let mut head = XmlElement::new("head");
            sanitize_mixed_content(head_text, &mut head, false);
            element.push_element(head);
        }

        let include_p = policy.include_paragraph(kind);
        if !content.trim().is_empty() {
            sanitize_mixed_content(content, element, include_p);
        }

        self.serialize_subnotes(&note.subnotes, element, include_p);
    }

    /// Append the structured parts of a multipart note to `parent`
    pub fn serialize_subnotes(&self, subnotes: &[Subnote], parent: &mut XmlElement, include_p: bool) {
        for subnote in subnotes {
            if subnote.is_unpublished() && !self.include_unpublished() {
                continue;
            }
            let unpublished = subnote.is_unpublished();

            match subnote {
                Subnote::Text { content, .. } => {
                    if let Some(content) = content.as_deref() {
                        sanitize_mixed_content(content, parent, include_p);
                    }
                }
                Subnote::Chronology { title, items, .. } => {
                    let mut chronlist = XmlElement::new("chronlist");
                    set_audience(&mut chronlist, unpublished);
                    push_list_head(&mut chronlist, title.as_deref());

                    for item in items {
                        let mut chronitem = XmlElement::new("chronitem");
                        let mut date = XmlElement::new("date");
                        if let Some(event_date) = item.event_date.as_deref() {
                            sanitize_mixed_content(event_date, &mut date, false);
                        }
                        chronitem.push_element(date);

                        match item.events.as_slice() {
                            [] => {}
                            [event] => chronitem.push_element(event_element(event)),
                            events => {
                                let mut eventgrp = XmlElement::new("eventgrp");
                                for event in events {
                                    eventgrp.push_element(event_element(event));
                                }
                                chronitem.push_element(eventgrp);
                            }
                        }
                        chronlist.push_element(chronitem);
                    }
                    parent.push_element(chronlist);
                }
                Subnote::OrderedList {
                    title,
                    enumeration,
                    items,
                    ..
                } => {
                    let mut list = XmlElement::new("list").with_attribute("type", "ordered");
                    if let Some(numeration) = non_empty(enumeration.as_deref()) {
                        list.set_attribute("numeration", numeration);
                    }
                    set_audience(&mut list, unpublished);
                    push_list_head(&mut list, title.as_deref());

                    for item in items {
                        let mut element = XmlElement::new("item");
                        sanitize_mixed_content(item, &mut element, false);
                        list.push_element(element);
                    }
                    parent.push_element(list);
                }
                Subnote::DefinedList { title, items, .. } => {
                    let mut list = XmlElement::new("list").with_attribute("type", "deflist");
                    set_audience(&mut list, unpublished);
                    push_list_head(&mut list, title.as_deref());

                    for item in items {
                        let mut label = XmlElement::new("label");
                        sanitize_mixed_content(item.label.as_deref().unwrap_or(""), &mut label, false);
                        let mut value = XmlElement::new("item");
                        sanitize_mixed_content(item.value.as_deref().unwrap_or(""), &mut value, false);
                        list.push_element(
                            XmlElement::new("defitem").with_child(label).with_child(value),
                        );
                    }
                    parent.push_element(list);
                }
                Subnote::Unsupported => {
                    log::debug!("Skipping unsupported subnote kind");
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Dispatchers
    // ------------------------------------------------------------------

    /// Append the record's archdesc-level notes, then agent biographical notes
    pub fn serialize_nondid_notes(&self, data: &DescriptionRecord, parent: &mut XmlElement) {
        let types = data
            .archdesc_note_types
            .as_ref()
            .unwrap_or(&self.options.policy.archdesc_note_types);

        for note in &data.notes {
            let kind = match self.eligible_kind(note, types) {
                Some(kind) => kind,
                None => continue,
            };
            if note.internal {
                log::debug!("Skipping internal note {:?}", note.persistent_id);
                continue;
            }

            if kind == NoteType::Legalstatus {
                let mut accessrestrict = XmlElement::new("accessrestrict");
                set_audience(&mut accessrestrict, note.is_unpublished());
                self.serialize_note_content(note, &mut accessrestrict, &[]);
                if accessrestrict.has_children() {
                    parent.push_element(accessrestrict);
                }
            } else {
                self.serialize_note_content(note, parent, &[]);
            }
        }

        self.serialize_agent_notes(data, parent);
    }

    /// Append biographical notes of linked creators and sources
    ///
    /// Each note is rendered from a published, non-internal copy typed
    /// `bioghist`, annotated with the agent's sort names.
    pub fn serialize_agent_notes(&self, data: &DescriptionRecord, parent: &mut XmlElement) {
        for link in &data.creators_and_sources {
            let agent = match link.resolved.as_ref() {
                Some(agent) => agent,
                None => {
                    log::debug!("Skipping unresolved agent link {:?}", link.reference);
                    continue;
                }
            };
            if agent.publish != Some(true) && !self.include_unpublished() {
                log::debug!("Skipping unpublished agent {:?}", link.reference);
                continue;
            }

            let names = agent.sort_names();
            for note in agent
                .notes
                .iter()
                .filter(|note| note.kind() == Some(NoteType::Bioghist))
            {
                let bioghist = Note {
                    note_type: Some(NoteType::Bioghist),
                    internal: false,
                    publish: Some(true),
                    ..note.clone()
                };
                self.serialize_note_content(&bioghist, parent, &names);
            }
        }
    }

    /// Append the record's DID-level notes
    ///
    /// `dimensions` and `physfacet` are wrapped in `physdesc`; no heads are
    /// written on this path.
    pub fn serialize_did_notes(&self, data: &DescriptionRecord, parent: &mut XmlElement) {
        let types = data
            .did_note_types
            .as_ref()
            .unwrap_or(&self.options.policy.did_note_types);

        for note in &data.notes {
            let kind = match self.eligible_kind(note, types) {
                Some(kind) => kind,
                None => continue,
            };
            if let Err(e) = validate_element_name(kind.as_str()) {
                log::warn!("Skipping note {:?}: {}", note.persistent_id, e);
                continue;
            }

            let unpublished = note.is_unpublished();
            let content = note.extract_text(self.include_unpublished());
            let include_p = self.options.policy.include_paragraph(&kind);

            let mut element = XmlElement::new(kind.as_str());
            if let Some(id) = self.prefix.apply(note.persistent_id.as_deref()) {
                element.set_attribute("id", id);
            }

            match kind {
                NoteType::Dimensions | NoteType::Physfacet => {
                    if let Some(label) = non_empty(note.label.as_deref()) {
                        element.set_attribute("label", label);
                    }
                    sanitize_mixed_content(&content, &mut element, include_p);
                    let mut physdesc = XmlElement::new("physdesc");
                    set_audience(&mut physdesc, unpublished);
                    physdesc.push_element(element);
                    parent.push_element(physdesc);
                }
                NoteType::Physdesc => {
                    if let Some(label) = non_empty(note.label.as_deref()) {
                        element.set_attribute("label", label);
                    }
                    set_audience(&mut element, unpublished);
                    sanitize_mixed_content(&content, &mut element, include_p);
                    parent.push_element(element);
                }
                _ => {
                    set_audience(&mut element, unpublished);
                    sanitize_mixed_content(&content, &mut element, include_p);
                    parent.push_element(element);
                }
            }
        }
    }

    fn eligible_kind(&self, note: &Note, types: &NoteTypeSet) -> Option<NoteType> {
        if note.is_unpublished() && !self.include_unpublished() {
            log::debug!("Skipping unpublished note {:?}", note.persistent_id);
            return None;
        }
        match &note.note_type {
            Some(note_type) if types.contains(note_type) => Some(note_type.clone()),
            Some(_) => None,
            None => {
                log::debug!("Skipping direct note without a type {:?}", note.persistent_id);
                None
            }
        }
    }
}

fn push_list_head(list: &mut XmlElement, title: Option<&str>) {
    if let Some(title) = non_empty(title) {
        let mut head = XmlElement::new("head");
        sanitize_mixed_content(title, &mut head, false);
        list.push_element(head);
    }
}

fn event_element(event: &str) -> XmlElement {
    let mut element = XmlElement::new("event");
    sanitize_mixed_content(event, &mut element, false);
    element
}

/// Location code in brackets right before the collection identifier
///
/// Finds the first `[code], <identifier>` in the long display string, where
/// `code` holds no brackets. Absence of any piece, or no match, yields `None`.
fn location_code(top: &TopContainer) -> Option<String> {
    let identifier = non_empty(top.collection.first()?.identifier.as_deref())?;
    let display = top.long_display_string.as_deref()?;
    let suffix = format!("], {}", identifier);

    display.match_indices(&suffix).find_map(|(end, _)| {
        let start = display[..end].rfind('[')?;
        let code = &display[start + 1..end];
        if code.contains(']') {
            None
        } else {
            Some(code.to_string())
        }
    })
}

fn encoding_analog(top: &TopContainer) -> Option<String> {
    let profile = top.container_profile.as_ref()?.resolved.as_ref()?;
    non_empty(profile.url.as_deref())
        .or_else(|| non_empty(profile.name.as_deref()))
        .map(str::to_string)
}
