pub const ABOUT_MAX_CHARS: usize = 300;

/// Descriptive data typed into the registration screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrphanageRecord {
    pub name: String,
    pub about: String,
    pub instructions: String,
    pub opening_hours: String,
    pub open_on_weekends: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    Name,
    About,
    Instructions,
    OpeningHours,
}

impl RequiredField {
    pub fn label(self) -> &'static str {
        match self {
            RequiredField::Name => "name",
            RequiredField::About => "about",
            RequiredField::Instructions => "instructions",
            RequiredField::OpeningHours => "opening_hours",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegistrationFormModel {
    record: OrphanageRecord,
}

impl RegistrationFormModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.record.name = name.into();
    }

    pub fn set_about(&mut self, about: impl Into<String>) {
        self.record.about = about.into();
    }

    pub fn set_instructions(&mut self, instructions: impl Into<String>) {
        self.record.instructions = instructions.into();
    }

    pub fn set_opening_hours(&mut self, opening_hours: impl Into<String>) {
        self.record.opening_hours = opening_hours.into();
    }

    pub fn set_open_on_weekends(&mut self, open: bool) {
        self.record.open_on_weekends = open;
    }

    pub fn record(&self) -> &OrphanageRecord {
        &self.record
    }

    pub fn snapshot(&self) -> OrphanageRecord {
        self.record.clone()
    }

    /// Characters left before the advised `about` length. Negative once the
    /// text runs over; nothing is truncated.
    pub fn about_chars_remaining(&self) -> i64 {
        ABOUT_MAX_CHARS as i64 - self.record.about.chars().count() as i64
    }

    pub fn missing_required(&self) -> Vec<RequiredField> {
        self.record.missing_required()
    }
}

impl OrphanageRecord {
    pub fn missing_required(&self) -> Vec<RequiredField> {
        [
            (RequiredField::Name, &self.name),
            (RequiredField::About, &self.about),
            (RequiredField::Instructions, &self.instructions),
            (RequiredField::OpeningHours, &self.opening_hours),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect()
    }
}
