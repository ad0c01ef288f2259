//! Form state and validation for the input screens.

use recipebox_core::albums::ALBUM_PALETTE;
use recipebox_core::tags;
use recipebox_core::{Recipe, RecipeDraft, RecipeId};
use std::path::PathBuf;
use zxcvbn::{zxcvbn, Score};

pub const MIN_PASSWORD_LEN: usize = 8;
pub const CODE_LEN: usize = 6;

/// A single-line text input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextField {
    pub label: &'static str,
    pub value: String,
    /// Render as asterisks.
    pub masked: bool,
}

impl TextField {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            ..Self::default()
        }
    }

    pub fn masked(label: &'static str) -> Self {
        Self {
            label,
            masked: true,
            ..Self::default()
        }
    }

    pub fn push(&mut self, c: char) {
        self.value.push(c);
    }

    pub fn pop(&mut self) {
        self.value.pop();
    }

    pub fn clear(&mut self) {
        self.value.clear();
    }

    pub fn trimmed(&self) -> &str {
        self.value.trim()
    }

    pub fn display(&self) -> String {
        if self.masked {
            "*".repeat(self.value.chars().count())
        } else {
            self.value.clone()
        }
    }
}

/// An ordered set of text fields with one focused.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSet {
    pub fields: Vec<TextField>,
    pub focus: usize,
}

impl FieldSet {
    pub fn new(fields: Vec<TextField>) -> Self {
        Self { fields, focus: 0 }
    }

    pub fn next(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + 1) % self.fields.len();
        }
    }

    pub fn prev(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
        }
    }

    pub fn focused_mut(&mut self) -> Option<&mut TextField> {
        self.fields.get_mut(self.focus)
    }

    pub fn value(&self, index: usize) -> &str {
        self.fields.get(index).map_or("", TextField::trimmed)
    }

    /// Untrimmed value, for passwords.
    pub fn raw(&self, index: usize) -> &str {
        self.fields.get(index).map_or("", |f| f.value.as_str())
    }
}

fn looks_like_email(text: &str) -> bool {
    let Some((local, domain)) = text.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

/// zxcvbn rating of a password.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Strength {
    /// 0 (very weak) to 4 (very strong).
    pub score: u8,
    pub label: &'static str,
}

pub fn password_strength(password: &str) -> Option<Strength> {
    if password.is_empty() {
        return None;
    }
    let entropy = zxcvbn(password, &[]);
    let (score, label) = match entropy.score() {
        Score::Zero => (0, "Very Weak"),
        Score::One => (1, "Weak"),
        Score::Two => (2, "Fair"),
        Score::Three => (3, "Strong"),
        Score::Four => (4, "Very Strong"),
        _ => (2, "Unknown"),
    };
    Some(Strength { score, label })
}

/// Steps of the sign-in screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignInStep {
    Credentials,
    /// Ask for a reset code.
    ForgotRequest,
    /// Enter the code and a new password.
    ForgotConfirm,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignInForm {
    pub step: SignInStep,
    pub credentials: FieldSet,
    pub forgot: FieldSet,
    pub reset: FieldSet,
    /// Confirmation shown above the form, e.g. after a reset.
    pub info: Option<String>,
    pub error: Option<String>,
}

impl Default for SignInForm {
    fn default() -> Self {
        Self {
            step: SignInStep::Credentials,
            credentials: FieldSet::new(vec![
                TextField::new("Username"),
                TextField::masked("Password"),
            ]),
            forgot: FieldSet::new(vec![TextField::new("Email")]),
            reset: FieldSet::new(vec![
                TextField::new("Code"),
                TextField::masked("New password"),
                TextField::masked("Confirm password"),
            ]),
            info: None,
            error: None,
        }
    }
}

impl SignInForm {
    pub fn fields_mut(&mut self) -> &mut FieldSet {
        match self.step {
            SignInStep::Credentials => &mut self.credentials,
            SignInStep::ForgotRequest => &mut self.forgot,
            SignInStep::ForgotConfirm => &mut self.reset,
        }
    }

    pub fn fields(&self) -> &FieldSet {
        match self.step {
            SignInStep::Credentials => &self.credentials,
            SignInStep::ForgotRequest => &self.forgot,
            SignInStep::ForgotConfirm => &self.reset,
        }
    }

    pub fn validate_credentials(&self) -> Result<(String, String), String> {
        let username = self.credentials.value(0);
        let password = self.credentials.raw(1);
        if username.is_empty() || password.is_empty() {
            return Err("Please enter both username and password".to_string());
        }
        Ok((username.to_string(), password.to_string()))
    }

    pub fn validate_forgot(&self) -> Result<String, String> {
        let username = self.forgot.value(0);
        if !looks_like_email(username) {
            return Err("Please enter a valid email address".to_string());
        }
        Ok(username.to_string())
    }

    /// Code and new password for the reset step.
    pub fn validate_reset(&self) -> Result<(String, String), String> {
        let code = self.reset.value(0);
        let password = self.reset.raw(1);
        let confirm = self.reset.raw(2);
        if code.chars().count() != CODE_LEN {
            return Err(format!("Please enter the {CODE_LEN}-digit code"));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            ));
        }
        if password != confirm {
            return Err("Passwords do not match".to_string());
        }
        Ok((code.to_string(), password.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignUpStep {
    Details,
    Confirm,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignUpForm {
    pub step: SignUpStep,
    pub details: FieldSet,
    pub confirm: FieldSet,
    /// Username the confirmation code belongs to.
    pub pending_username: Option<String>,
    pub error: Option<String>,
}

impl Default for SignUpForm {
    fn default() -> Self {
        Self {
            step: SignUpStep::Details,
            details: FieldSet::new(vec![
                TextField::new("Username"),
                TextField::new("Email"),
                TextField::masked("Password"),
                TextField::masked("Confirm password"),
            ]),
            confirm: FieldSet::new(vec![TextField::new("Confirmation code")]),
            pending_username: None,
            error: None,
        }
    }
}

impl SignUpForm {
    pub const PASSWORD: usize = 2;

    pub fn fields_mut(&mut self) -> &mut FieldSet {
        match self.step {
            SignUpStep::Details => &mut self.details,
            SignUpStep::Confirm => &mut self.confirm,
        }
    }

    pub fn fields(&self) -> &FieldSet {
        match self.step {
            SignUpStep::Details => &self.details,
            SignUpStep::Confirm => &self.confirm,
        }
    }

    pub fn validate_details(&self) -> Result<recipebox_core::SignUp, String> {
        let username = self.details.value(0);
        let email = self.details.value(1);
        let password = self.details.raw(Self::PASSWORD);
        let confirm = self.details.raw(3);

        if username.is_empty() || email.is_empty() || password.is_empty() {
            return Err("All fields are required".to_string());
        }
        if !looks_like_email(email) {
            return Err("Please enter a valid email address".to_string());
        }
        if password != confirm {
            return Err("Passwords do not match".to_string());
        }
        Ok(recipebox_core::SignUp {
            username: username.to_string(),
            password: password.to_string(),
            email: email.to_string(),
        })
    }

    pub fn validate_code(&self) -> Result<String, String> {
        let code = self.confirm.value(0);
        if code.is_empty() {
            return Err("Please enter the confirmation code".to_string());
        }
        Ok(code.to_string())
    }
}

/// Which part of the recipe editor has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorFocus {
    Title,
    Minutes,
    Description,
    Ingredients,
    Steps,
    Tags,
    Image,
}

impl EditorFocus {
    const ORDER: [EditorFocus; 7] = [
        EditorFocus::Title,
        EditorFocus::Minutes,
        EditorFocus::Description,
        EditorFocus::Ingredients,
        EditorFocus::Steps,
        EditorFocus::Tags,
        EditorFocus::Image,
    ];

    fn position(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ORDER[(self.position() + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        Self::ORDER[(self.position() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

/// Recipe create/edit form.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeForm {
    /// Set when editing an existing recipe.
    pub editing: Option<RecipeId>,
    pub focus: EditorFocus,
    pub title: TextField,
    pub minutes: TextField,
    pub description: TextField,
    /// Comma-separated.
    pub ingredients: TextField,
    pub steps: Vec<String>,
    /// Text of the step being typed.
    pub step_input: TextField,
    pub tags: Vec<String>,
    /// Cursor into [`tags::all_tags`].
    pub tag_cursor: usize,
    pub image: TextField,
    pub errors: Vec<String>,
}

impl Default for RecipeForm {
    fn default() -> Self {
        Self {
            editing: None,
            focus: EditorFocus::Title,
            title: TextField::new("Title"),
            minutes: TextField::new("Time (minutes)"),
            description: TextField::new("Description"),
            ingredients: TextField::new("Ingredients (comma separated)"),
            steps: Vec::new(),
            step_input: TextField::new("New step"),
            tags: Vec::new(),
            tag_cursor: 0,
            image: TextField::new("Image file"),
            errors: Vec::new(),
        }
    }
}

impl RecipeForm {
    pub fn for_recipe(recipe: &Recipe) -> Self {
        let draft = RecipeDraft::from_recipe(recipe);
        let mut form = Self {
            editing: Some(recipe.id.clone()),
            steps: draft.steps,
            tags: draft.tags,
            ..Self::default()
        };
        form.title.value = draft.title;
        form.minutes.value = if draft.minutes > 0 {
            draft.minutes.to_string()
        } else {
            String::new()
        };
        form.description.value = draft.description;
        form.ingredients.value = draft.ingredients.join(", ");
        form
    }

    /// The text field under focus, if the focus is on one.
    pub fn focused_field(&mut self) -> Option<&mut TextField> {
        match self.focus {
            EditorFocus::Title => Some(&mut self.title),
            EditorFocus::Minutes => Some(&mut self.minutes),
            EditorFocus::Description => Some(&mut self.description),
            EditorFocus::Ingredients => Some(&mut self.ingredients),
            EditorFocus::Steps => Some(&mut self.step_input),
            EditorFocus::Image => Some(&mut self.image),
            EditorFocus::Tags => None,
        }
    }

    pub fn add_step(&mut self) {
        let step = self.step_input.trimmed().to_string();
        if !step.is_empty() {
            self.steps.push(step);
            self.step_input.clear();
        }
    }

    pub fn remove_last_step(&mut self) {
        self.steps.pop();
    }

    pub fn move_tag_cursor(&mut self, delta: isize) {
        let count = tags::all_tags().count();
        if count == 0 {
            return;
        }
        let next = (self.tag_cursor as isize + delta).rem_euclid(count as isize);
        self.tag_cursor = next as usize;
    }

    pub fn toggle_tag_at_cursor(&mut self) {
        let Some(tag) = tags::all_tags().nth(self.tag_cursor) else {
            return;
        };
        if let Some(pos) = self.tags.iter().position(|t| t == tag) {
            self.tags.remove(pos);
        } else {
            self.tags.push(tag.to_string());
        }
    }

    /// Validate and build the submission, collecting every problem.
    pub fn to_draft(&self) -> Result<RecipeDraft, Vec<String>> {
        let mut errors = Vec::new();

        let title = self.title.trimmed();
        if title.is_empty() {
            errors.push("Title is required".to_string());
        }

        let minutes = match self.minutes.trimmed().parse::<u32>() {
            Ok(m) if m > 0 => m,
            _ => {
                errors.push("Time must be a positive number of minutes".to_string());
                0
            }
        };

        let description = self.description.trimmed();
        if description.is_empty() {
            errors.push("Description is required".to_string());
        }

        let ingredients = RecipeDraft::split_ingredients(&self.ingredients.value);
        if ingredients.is_empty() {
            errors.push("At least one ingredient is required".to_string());
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let image = self.image.trimmed();
        Ok(RecipeDraft {
            title: title.to_string(),
            minutes,
            description: description.to_string(),
            ingredients,
            steps: self.steps.clone(),
            tags: self.tags.clone(),
            image: (!image.is_empty()).then(|| PathBuf::from(image)),
        })
    }
}

/// New-album form: a name plus a palette choice.
#[derive(Debug, Clone, PartialEq)]
pub struct AlbumForm {
    pub name: TextField,
    pub color_index: usize,
    pub error: Option<String>,
}

impl Default for AlbumForm {
    fn default() -> Self {
        Self {
            name: TextField::new("Album name"),
            color_index: 0,
            error: None,
        }
    }
}

impl AlbumForm {
    pub fn cycle_color(&mut self, delta: isize) {
        let len = ALBUM_PALETTE.len() as isize;
        self.color_index = (self.color_index as isize + delta).rem_euclid(len) as usize;
    }

    pub fn color(&self) -> &'static str {
        ALBUM_PALETTE[self.color_index % ALBUM_PALETTE.len()].1
    }

    pub fn validate(&self) -> Result<String, String> {
        let name = self.name.trimmed();
        if name.is_empty() {
            return Err("Album name is required".to_string());
        }
        Ok(name.to_string())
    }
}
