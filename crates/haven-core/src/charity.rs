//! Charities listed in the directory.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result, Row, Value,
  dedup::{Dedupe, first_non_empty, key_part},
  encode::{decode_dt, encode_key, encode_opt_dt},
  url::{normalize_link, normalize_url},
};

/// What kinds of help a charity offers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capabilities {
  pub helpline:      bool,
  pub volunteers:    bool,
  pub crisis_info:   bool,
  pub text_support:  bool,
  pub email_support: bool,
  pub live_chat:     bool,
}

impl Capabilities {
  /// Logical OR, field by field.
  pub fn union(self, other: Self) -> Self {
    Self {
      helpline:      self.helpline || other.helpline,
      volunteers:    self.volunteers || other.volunteers,
      crisis_info:   self.crisis_info || other.crisis_info,
      text_support:  self.text_support || other.text_support,
      email_support: self.email_support || other.email_support,
      live_chat:     self.live_chat || other.live_chat,
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Charity {
  pub id:           Option<i64>,
  pub name:         String,
  pub description:  String,
  pub site_url:     String,
  pub logo_url:     String,
  pub phone:        String,
  pub email:        String,
  pub text_number:  String,
  pub capabilities: Capabilities,
  pub created_at:   Option<DateTime<Utc>>,
}

/// Insert column order, matching [`Charity::insert_params`].
pub const INSERT_COLUMNS: &str = "name, description, site_url, logo_url, phone, email, \
   text_number, has_helpline, has_volunteers, has_crisis_info, has_text_support, \
   has_email_support, has_live_chat, created_at, dedup_key";

impl Charity {
  pub fn new(name: impl Into<String>, site_url: impl Into<String>) -> Self {
    Self { name: name.into(), site_url: site_url.into(), ..Self::default() }
  }

  pub fn from_row(row: &Row) -> Result<Self> {
    Ok(Self {
      id:           Some(row.id("id")?),
      name:         row.text("name")?,
      description:  row.text("description")?,
      site_url:     row.text("site_url")?,
      logo_url:     row.text("logo_url")?,
      phone:        row.text("phone")?,
      email:        row.text("email")?,
      text_number:  row.text("text_number")?,
      capabilities: Capabilities {
        helpline:      row.flag("has_helpline")?,
        volunteers:    row.flag("has_volunteers")?,
        crisis_info:   row.flag("has_crisis_info")?,
        text_support:  row.flag("has_text_support")?,
        email_support: row.flag("has_email_support")?,
        live_chat:     row.flag("has_live_chat")?,
      },
      created_at:   decode_dt(&row.text("created_at")?)?,
    })
  }

  /// Trim free text and normalize links before persisting.
  pub fn normalized(self) -> Self {
    Self {
      name:        self.name.trim().to_owned(),
      description: self.description.trim().to_owned(),
      site_url:    normalize_url(&self.site_url),
      logo_url:    normalize_link(&self.logo_url),
      phone:       self.phone.trim().to_owned(),
      email:       self.email.trim().to_owned(),
      text_number: self.text_number.trim().to_owned(),
      ..self
    }
  }

  pub fn validate(&self) -> Result<()> {
    if self.name.trim().is_empty() {
      return Err(Error::Invalid { entity: "charity", reason: "name is required".into() });
    }
    Ok(())
  }

  /// The `dedup_key` column value.
  pub fn key_string(&self) -> String {
    let (name, site) = self.dedup_key();
    encode_key(&[&name, &site])
  }

  /// Parameters in [`INSERT_COLUMNS`] order.
  pub fn insert_params(&self) -> Vec<Value> {
    let c = self.capabilities;
    crate::params![
      &self.name,
      &self.description,
      &self.site_url,
      &self.logo_url,
      &self.phone,
      &self.email,
      &self.text_number,
      c.helpline,
      c.volunteers,
      c.crisis_info,
      c.text_support,
      c.email_support,
      c.live_chat,
      encode_opt_dt(self.created_at),
      self.key_string(),
    ]
  }
}

impl Dedupe for Charity {
  type Key = (String, String);

  fn dedup_key(&self) -> Self::Key { (key_part(&self.name), key_part(&self.site_url)) }

  fn absorb(&mut self, other: Self) {
    self.capabilities = self.capabilities.union(other.capabilities);
    first_non_empty(&mut self.description, other.description);
    first_non_empty(&mut self.site_url, other.site_url);
    first_non_empty(&mut self.logo_url, other.logo_url);
    first_non_empty(&mut self.phone, other.phone);
    first_non_empty(&mut self.email, other.email);
    first_non_empty(&mut self.text_number, other.text_number);
    if self.created_at.is_none() {
      self.created_at = other.created_at;
    }
  }

  fn row_id(&self) -> Option<i64> { self.id }
}

/// The starter list shown before an admin has added anything.
pub fn defaults() -> Vec<Charity> {
  vec![
    Charity {
      description: "Providing advice and empowering people experiencing mental health \
                    problems through helplines, advocacy, and community programs."
        .into(),
      logo_url: "https://upload.wikimedia.org/wikipedia/commons/thumb/6/60/Mind.svg/320px-Mind.svg.png"
        .into(),
      capabilities: Capabilities { helpline: true, ..Capabilities::default() },
      ..Charity::new("Mind (UK)", "https://www.mind.org.uk/")
    },
    Charity {
      description: "Education, support groups, and advocacy to build better lives for \
                    individuals and families affected by mental illness."
        .into(),
      logo_url: "https://upload.wikimedia.org/wikipedia/commons/thumb/f/f8/NAMI-Logo.svg/320px-NAMI-Logo.svg.png"
        .into(),
      capabilities: Capabilities { helpline: true, volunteers: true, ..Capabilities::default() },
      ..Charity::new("NAMI", "https://www.nami.org/")
    },
    Charity {
      description: "Crisis intervention and suicide prevention services for LGBTQ+ young \
                    people, available 24/7 via phone, chat, and text."
        .into(),
      logo_url: "https://upload.wikimedia.org/wikipedia/commons/thumb/9/9f/The_Trevor_Project_logo.svg/320px-The_Trevor_Project_logo.svg.png"
        .into(),
      capabilities: Capabilities {
        helpline:     true,
        crisis_info:  true,
        text_support: true,
        live_chat:    true,
        ..Capabilities::default()
      },
      ..Charity::new("The Trevor Project", "https://www.thetrevorproject.org/")
    },
  ]
}
