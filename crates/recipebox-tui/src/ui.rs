//! UI rendering with Ratatui.

use crate::app::{
    filter_entries, App, FilterEntry, HomeFocus, Overlay, Screen, CARD_WIDTH,
};
use crate::forms::{password_strength, EditorFocus, FieldSet, SignInStep, SignUpForm, SignUpStep};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    prelude::*,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use recipebox_core::albums::ALBUM_PALETTE;
use recipebox_core::search::TIME_BUCKETS;
use recipebox_core::{tags, Lane, Recipe, ResultSource};

const SELECTED_BG: Color = Color::Rgb(60, 60, 80);

const PERKS: [&str; 5] = [
    "Save any recipe into your own albums",
    "Upload recipes with photos",
    "Edit and delete the recipes you shared",
    "Keep albums organised by colour",
    "Pick up where you left off on any device",
];

/// Main render function.
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(area);

    render_header(frame, app, chunks[0]);

    match &app.screen {
        Screen::Home => render_home(frame, app, chunks[1]),
        Screen::RecipeDetail(_) => render_detail(frame, app, chunks[1]),
        Screen::MyRecipes => render_my_recipes(frame, app, chunks[1]),
        Screen::Editor => render_editor(frame, app, chunks[1]),
        Screen::Albums => render_albums(frame, app, chunks[1]),
        Screen::AlbumDetail(_) => render_album_detail(frame, app, chunks[1]),
        Screen::Profile => render_profile(frame, app, chunks[1]),
        Screen::SignIn => render_sign_in(frame, app, chunks[1]),
        Screen::SignUp => render_sign_up(frame, app, chunks[1]),
        Screen::Perks => render_perks(frame, chunks[1]),
    }

    let help = Paragraph::new(help_text(app)).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, chunks[2]);

    if let Some(overlay) = &app.overlay {
        render_overlay(frame, app, overlay, area);
    }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let user = match app.session.user() {
        Some(user) => Span::styled(
            format!("[{}] {} ", user.initials(), user.username),
            Style::default().fg(Color::Green),
        ),
        None => Span::styled(
            "i: sign in  u: sign up ",
            Style::default().fg(Color::Yellow),
        ),
    };

    let title = Line::from(vec![
        Span::styled(
            " recipebox ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(app.screen.title(), Style::default().fg(Color::White)),
    ]);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(user.width() as u16)])
        .split(area);
    frame.render_widget(Paragraph::new(title), chunks[0]);
    frame.render_widget(Paragraph::new(Line::from(user)), chunks[1]);
}

fn help_text(app: &App) -> &'static str {
    if app.overlay.is_some() {
        return " Enter: confirm | Esc: close";
    }
    match app.screen {
        Screen::Home => match app.home.focus {
            HomeFocus::Carousel => {
                " ←/→: push row | ↑/↓: switch row | Enter: open | Tab: focus | 1-5: views | Ctrl+P: find | q: quit"
            }
            HomeFocus::Search => " type to search | Enter: run | Esc: back | Tab: focus",
            HomeFocus::Filters => " ↑/↓: move | Space: toggle | c: clear | Tab: focus",
            HomeFocus::Results => " ↑/↓: move | Enter: open | Tab: focus",
        },
        Screen::RecipeDetail(_) => " s: save to album | e: edit | d: delete | Esc: back",
        Screen::MyRecipes => " ↑/↓: move | Enter: open | n: new recipe | Esc: back",
        Screen::Editor => {
            " Tab: next field | Enter: add step | Del: drop last step | Space: toggle tag | Ctrl+S: save | Esc: cancel"
        }
        Screen::Albums => " ↑/↓: move | Enter: open | c: create | d: delete | Esc: back",
        Screen::AlbumDetail(_) => " ↑/↓: move | Enter: open | r: remove | Esc: back",
        Screen::Profile => " l: log out | Esc: back",
        Screen::SignIn => " Tab: next field | Enter: submit | Ctrl+F: forgot password | Esc: back",
        Screen::SignUp => " Tab: next field | Enter: submit | Esc: back",
        Screen::Perks => " Esc: back",
    }
}

fn block(title: &str, focused: bool) -> Block<'static> {
    let border_color = if focused { Color::Cyan } else { Color::DarkGray };
    Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
}

fn selected_style() -> Style {
    Style::default()
        .bg(SELECTED_BG)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD)
}

/// Pad or cut `text` to exactly `width` characters.
fn fit(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count > width {
        let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
        cut.push('…');
        cut
    } else {
        format!("{text}{}", " ".repeat(width - count))
    }
}

/// `#RRGGBB` to a terminal colour.
pub fn hex_color(hex: &str) -> Option<Color> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 {
        return None;
    }
    let value = u32::from_str_radix(digits, 16).ok()?;
    Some(Color::Rgb(
        (value >> 16) as u8,
        (value >> 8 & 0xFF) as u8,
        (value & 0xFF) as u8,
    ))
}

/// Palette name for a hex colour.
pub fn palette_name(hex: &str) -> Option<&'static str> {
    ALBUM_PALETTE
        .iter()
        .find(|(_, h)| h.eq_ignore_ascii_case(hex))
        .map(|(name, _)| *name)
}

fn swatch(hex: &str) -> Span<'static> {
    Span::styled(
        "██ ",
        Style::default().fg(hex_color(hex).unwrap_or(Color::Gray)),
    )
}

fn recipe_line(recipe: &Recipe) -> Line<'_> {
    Line::from(vec![
        Span::styled(recipe.title.as_str(), Style::default().fg(Color::White)),
        Span::styled(
            format!("  {}", recipe.time.display()),
            Style::default().fg(Color::Yellow),
        ),
        Span::styled(
            format!("  {}", recipe.tags.join(", ")),
            Style::default().fg(Color::DarkGray),
        ),
    ])
}

fn recipe_list(frame: &mut Frame, recipes: &[&Recipe], selected: Option<usize>, area: Rect) {
    let items: Vec<ListItem> = recipes.iter().map(|r| ListItem::new(recipe_line(r))).collect();
    let list = List::new(items).highlight_style(selected_style());
    let mut state = ListState::default().with_selected(selected);
    frame.render_stateful_widget(list, area, &mut state);
}

fn centered_message(frame: &mut Frame, message: &str, area: Rect) {
    let paragraph = Paragraph::new(message)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, centered_rect(area.width, 1, area));
}

// Home

fn render_home(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Length(4), Constraint::Min(5)])
        .split(area);

    render_carousel_row(frame, app, Lane::Top, chunks[0]);
    render_carousel_row(frame, app, Lane::Bottom, chunks[1]);

    let lower = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(chunks[2]);
    render_filters(frame, app, lower[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(lower[1]);
    render_search_box(frame, app, right[0]);
    render_results(frame, app, right[1]);
}

/// Two text lines for each card, concatenated across the row.
fn strip_lines(recipes: &[&Recipe]) -> (Vec<char>, Vec<char>) {
    let mut titles = Vec::new();
    let mut metas = Vec::new();
    for recipe in recipes {
        let meta = match recipe.tags.first() {
            Some(tag) => format!("{} · {}", recipe.time.display(), tag),
            None => recipe.time.display(),
        };
        titles.extend(format!(" {}│", fit(&recipe.title, CARD_WIDTH - 2)).chars());
        metas.extend(format!(" {}│", fit(&meta, CARD_WIDTH - 2)).chars());
    }
    (titles, metas)
}

fn window(strip: &[char], start: usize, width: usize) -> String {
    if strip.is_empty() {
        return String::new();
    }
    (0..width).map(|i| strip[(start + i) % strip.len()]).collect()
}

fn render_carousel_row(frame: &mut Frame, app: &App, lane: Lane, area: Rect) {
    let focused = app.home.focus == HomeFocus::Carousel && app.home.lane == lane;
    let row = app.carousel.row(lane);
    let arrow = match row.direction() {
        recipebox_core::Direction::Left => "◀",
        recipebox_core::Direction::Right => "▶",
    };
    let title = match lane {
        Lane::Top => format!("Fresh picks {arrow}"),
        Lane::Bottom => format!("More to try {arrow}"),
    };
    let block = block(&title, focused);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let recipes = app.carousel_recipes(lane);
    if recipes.is_empty() {
        centered_message(frame, "No recipes yet", inner);
        return;
    }

    let (titles, metas) = strip_lines(&recipes);
    let start = app
        .carousel_half_width()
        .map_or(0, |half| row.window_start(half).floor() as usize);
    let width = inner.width as usize;

    let lines = vec![
        Line::styled(
            window(&titles, start, width),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Line::styled(window(&metas, start, width), Style::default().fg(Color::Yellow)),
    ];
    frame.render_widget(Paragraph::new(lines), inner);
}

fn filter_label(entry: FilterEntry) -> String {
    match entry {
        FilterEntry::Time(i) => TIME_BUCKETS[i].label.to_string(),
        FilterEntry::Tag(tag) => match tags::category_of(tag) {
            Some(category) => format!("{tag} ({category})"),
            None => tag.to_string(),
        },
    }
}

fn render_filters(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.home.focus == HomeFocus::Filters;
    let filter = &app.home.filter;
    let block = block("Filters", focused);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let items: Vec<ListItem> = filter_entries()
        .into_iter()
        .map(|entry| {
            let active = match entry {
                FilterEntry::Time(i) => filter.time == Some(TIME_BUCKETS[i]),
                FilterEntry::Tag(tag) => filter.tags.iter().any(|t| t == tag),
            };
            let mark = if active { "[x]" } else { "[ ]" };
            let style = if active {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::Gray)
            };
            ListItem::new(format!("{mark} {}", filter_label(entry))).style(style)
        })
        .collect();

    let list = List::new(items).highlight_style(selected_style());
    let mut state = ListState::default().with_selected(focused.then_some(app.home.filter_cursor));
    frame.render_stateful_widget(list, inner, &mut state);
}

fn render_search_box(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.home.focus == HomeFocus::Search;
    let cursor = if focused { "_" } else { "" };
    let input = Paragraph::new(Line::from(vec![
        Span::styled("▸ ", Style::default().fg(Color::Magenta)),
        Span::styled(app.home.query.value.as_str(), Style::default().fg(Color::White)),
        Span::styled(cursor, Style::default().add_modifier(Modifier::SLOW_BLINK)),
    ]))
    .block(block("Search", focused));
    frame.render_widget(input, area);
}

fn render_results(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.home.focus == HomeFocus::Results;
    let results: Vec<&Recipe> = app.home_results().iter().collect();
    let source = match app.search.last_source() {
        Some(ResultSource::Local) => " (offline filter)",
        _ => "",
    };
    let block = block(&format!("Recipes: {}{source}", results.len()), focused);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if results.is_empty() {
        centered_message(frame, "No recipes match your filters", inner);
        return;
    }
    recipe_list(
        frame,
        &results,
        focused.then_some(app.home.results.selected),
        inner,
    );
}

// Recipe views

fn render_detail(frame: &mut Frame, app: &App, area: Rect) {
    let Some(detail) = &app.detail else {
        let block = block("Recipe", true);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        centered_message(frame, "Recipe not available", inner);
        return;
    };
    let recipe = &detail.recipe;

    let label = Style::default().fg(Color::DarkGray);
    let mut lines = vec![
        Line::from(Span::styled(
            recipe.title.as_str(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled("By ", label),
            Span::styled(recipe.user_id.as_str(), Style::default().fg(Color::Green)),
            Span::styled("  Time ", label),
            Span::styled(recipe.time.display(), Style::default().fg(Color::Yellow)),
            Span::styled(
                if detail.saved { "  ★ Saved" } else { "" },
                Style::default().fg(Color::Magenta),
            ),
        ]),
    ];
    if !recipe.tags.is_empty() {
        lines.push(Line::from(Span::styled(
            recipe.tags.iter().map(|t| format!("#{t}")).collect::<Vec<_>>().join(" "),
            Style::default().fg(Color::Cyan),
        )));
    }
    if let Some(url) = &recipe.image_url {
        lines.push(Line::from(vec![Span::styled("Image ", label), Span::raw(url.as_str())]));
    }
    lines.push(Line::default());
    lines.push(Line::from(recipe.description.as_str()));
    lines.push(Line::default());
    lines.push(Line::from(Span::styled("Ingredients", label)));
    lines.extend(recipe.ingredients.iter().map(|i| Line::from(format!("  • {i}"))));
    lines.push(Line::default());
    lines.push(Line::from(Span::styled("Steps", label)));
    lines.extend(
        recipe
            .steps
            .iter()
            .enumerate()
            .map(|(n, step)| Line::from(format!("  {}. {step}", n + 1))),
    );
    if app.is_owner(recipe) {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            "You own this recipe: e to edit, d to delete",
            label,
        )));
    }

    let paragraph = Paragraph::new(lines)
        .block(block("Recipe", true))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_my_recipes(frame: &mut Frame, app: &App, area: Rect) {
    let block = block(&format!("My Recipes: {}", app.my_recipes.len()), true);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if app.my_recipes.is_empty() {
        centered_message(frame, "You have not shared any recipes yet. Press n to add one.", inner);
        return;
    }
    let recipes: Vec<&Recipe> = app.my_recipes.iter().collect();
    recipe_list(frame, &recipes, Some(app.my_recipes_cursor.selected), inner);
}

fn field_line<'a>(label: &'a str, value: String, focused: bool) -> Line<'a> {
    let value_style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::White)
    };
    let marker = if focused { "▸ " } else { "  " };
    let cursor = if focused { "_" } else { "" };
    Line::from(vec![
        Span::styled(marker, Style::default().fg(Color::Cyan)),
        Span::styled(format!("{label}: "), Style::default().fg(Color::DarkGray)),
        Span::styled(value, value_style),
        Span::raw(cursor),
    ])
}

fn render_editor(frame: &mut Frame, app: &App, area: Rect) {
    let editor = &app.editor;
    let title = if editor.editing.is_some() {
        "Edit Recipe"
    } else {
        "New Recipe"
    };
    let focus = editor.focus;

    let mut lines = vec![
        field_line(editor.title.label, editor.title.display(), focus == EditorFocus::Title),
        field_line(
            editor.minutes.label,
            editor.minutes.display(),
            focus == EditorFocus::Minutes,
        ),
        field_line(
            editor.description.label,
            editor.description.display(),
            focus == EditorFocus::Description,
        ),
        field_line(
            editor.ingredients.label,
            editor.ingredients.display(),
            focus == EditorFocus::Ingredients,
        ),
        Line::default(),
        Line::from(Span::styled("  Steps", Style::default().fg(Color::DarkGray))),
    ];
    lines.extend(
        editor
            .steps
            .iter()
            .enumerate()
            .map(|(n, step)| Line::from(format!("    {}. {step}", n + 1))),
    );
    lines.push(field_line(
        editor.step_input.label,
        editor.step_input.display(),
        focus == EditorFocus::Steps,
    ));
    lines.push(Line::default());

    let tags_focused = focus == EditorFocus::Tags;
    let mut tag_spans = vec![Span::styled(
        if tags_focused { "▸ Tags: " } else { "  Tags: " },
        Style::default().fg(Color::DarkGray),
    )];
    for (i, tag) in tags::all_tags().enumerate() {
        let chosen = editor.tags.iter().any(|t| t == tag);
        let mut style = if chosen {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        if tags_focused && i == editor.tag_cursor {
            style = style.bg(SELECTED_BG);
        }
        let text = if chosen {
            format!("[{tag}]")
        } else {
            tag.to_string()
        };
        tag_spans.push(Span::styled(text, style));
        tag_spans.push(Span::raw(" "));
    }
    lines.push(Line::from(tag_spans));
    lines.push(Line::default());
    lines.push(field_line(
        editor.image.label,
        editor.image.display(),
        focus == EditorFocus::Image,
    ));

    if !editor.errors.is_empty() {
        lines.push(Line::default());
        lines.extend(
            editor
                .errors
                .iter()
                .map(|e| Line::styled(format!("  ✗ {e}"), Style::default().fg(Color::Red))),
        );
    }

    let paragraph = Paragraph::new(lines)
        .block(block(title, true))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

// Albums

fn render_albums(frame: &mut Frame, app: &App, area: Rect) {
    let albums = app.albums.albums();
    let block = block(&format!("Albums: {}", albums.len()), true);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if albums.is_empty() {
        centered_message(frame, "No albums yet. Press c to create one.", inner);
        return;
    }

    let items: Vec<ListItem> = albums
        .iter()
        .map(|album| {
            let count = album.valid_recipe_count();
            let noun = if count == 1 { "recipe" } else { "recipes" };
            let color = palette_name(&album.color).unwrap_or(album.color.as_str());
            ListItem::new(Line::from(vec![
                swatch(&album.color),
                Span::styled(album.name.as_str(), Style::default().fg(Color::White)),
                Span::styled(
                    format!("  {count} {noun}  {color}"),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();
    let list = List::new(items).highlight_style(selected_style());
    let mut state = ListState::default().with_selected(Some(app.albums_cursor.selected));
    frame.render_stateful_widget(list, inner, &mut state);
}

fn render_album_detail(frame: &mut Frame, app: &App, area: Rect) {
    let Some(album) = &app.album_detail else {
        let block = block("Album", true);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        centered_message(frame, "Album not available", inner);
        return;
    };

    let block = block(&album.name, true).border_style(
        Style::default().fg(hex_color(&album.color).unwrap_or(Color::Cyan)),
    );
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let recipes: Vec<&Recipe> = album.resolved_recipes().collect();
    if recipes.is_empty() {
        centered_message(frame, "This album is empty", inner);
        return;
    }
    recipe_list(frame, &recipes, Some(app.album_detail_cursor.selected), inner);
}

// Account views

fn render_profile(frame: &mut Frame, app: &App, area: Rect) {
    let block = block("Profile", true);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(user) = app.session.user() else {
        centered_message(frame, "Not signed in", inner);
        return;
    };

    let label = Style::default().fg(Color::DarkGray);
    let recipes = app
        .profile_recipe_count
        .map_or_else(|| "unknown".to_string(), |n| n.to_string());
    let lines = vec![
        Line::from(Span::styled(
            format!(" {} ", user.initials()),
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        Line::from(vec![Span::styled("Username  ", label), Span::raw(user.username.as_str())]),
        Line::from(vec![
            Span::styled("Email     ", label),
            Span::raw(user.email.as_deref().unwrap_or("-")),
        ]),
        Line::from(vec![
            Span::styled("Albums    ", label),
            Span::raw(app.albums.albums().len().to_string()),
        ]),
        Line::from(vec![Span::styled("Recipes   ", label), Span::raw(recipes)]),
    ];
    let area = Layout::default()
        .margin(1)
        .constraints([Constraint::Min(1)])
        .split(inner)[0];
    frame.render_widget(Paragraph::new(lines), area);
}

fn strength_line(password: &str) -> Option<Line<'static>> {
    let strength = password_strength(password)?;
    let color = match strength.score {
        0 | 1 => Color::Red,
        2 => Color::Yellow,
        _ => Color::Green,
    };
    let filled = usize::from(strength.score) + 1;
    Some(Line::from(vec![
        Span::styled("  Strength: ", Style::default().fg(Color::DarkGray)),
        Span::styled("■".repeat(filled), Style::default().fg(color)),
        Span::styled("□".repeat(5 - filled), Style::default().fg(Color::DarkGray)),
        Span::styled(format!(" {}", strength.label), Style::default().fg(color)),
    ]))
}

/// Lines for a field set, with a strength meter under `meter_field`.
fn fieldset_lines(set: &FieldSet, meter_field: Option<usize>) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (i, field) in set.fields.iter().enumerate() {
        lines.push(field_line(field.label, field.display(), i == set.focus));
        if meter_field == Some(i) {
            if let Some(meter) = strength_line(&field.value) {
                lines.push(meter);
            }
        }
    }
    lines
}

fn message_lines(info: Option<&str>, error: Option<&str>) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    if let Some(info) = info {
        lines.push(Line::styled(info.to_string(), Style::default().fg(Color::Green)));
    }
    if let Some(error) = error {
        lines.push(Line::styled(error.to_string(), Style::default().fg(Color::Red)));
    }
    lines
}

fn render_form(frame: &mut Frame, title: &str, lines: Vec<Line<'_>>, area: Rect) {
    let height = (lines.len() as u16 + 4).min(area.height);
    let width = 64.min(area.width);
    let dialog = centered_rect(width, height, area);
    let paragraph = Paragraph::new(lines)
        .block(block(title, true))
        .wrap(Wrap { trim: false });
    frame.render_widget(Clear, dialog);
    frame.render_widget(paragraph, dialog);
}

fn render_sign_in(frame: &mut Frame, app: &App, area: Rect) {
    let form = &app.sign_in;
    let meter = (app.config.show_password_strength && form.step == SignInStep::ForgotConfirm)
        .then_some(1);
    let (title, hint) = match form.step {
        SignInStep::Credentials => ("Sign In", "Ctrl+F if you forgot your password"),
        SignInStep::ForgotRequest => ("Reset Password", "We will email you a reset code"),
        SignInStep::ForgotConfirm => ("Reset Password", "Enter the code and a new password"),
    };

    let mut lines = message_lines(form.info.as_deref(), form.error.as_deref());
    if !lines.is_empty() {
        lines.push(Line::default());
    }
    lines.extend(fieldset_lines(form.fields(), meter));
    lines.push(Line::default());
    lines.push(Line::styled(hint, Style::default().fg(Color::DarkGray)));
    render_form(frame, title, lines, area);
}

fn render_sign_up(frame: &mut Frame, app: &App, area: Rect) {
    let form = &app.sign_up;
    let mut lines = message_lines(None, form.error.as_deref());
    if !lines.is_empty() {
        lines.push(Line::default());
    }

    match form.step {
        SignUpStep::Details => {
            let meter = app
                .config
                .show_password_strength
                .then_some(SignUpForm::PASSWORD);
            lines.extend(fieldset_lines(form.fields(), meter));
        }
        SignUpStep::Confirm => {
            let who = form.pending_username.as_deref().unwrap_or("your email");
            lines.push(Line::from(format!("We sent a confirmation code to {who}.")));
            lines.push(Line::default());
            lines.extend(fieldset_lines(form.fields(), None));
        }
    }
    render_form(frame, "Create Account", lines, area);
}

fn render_perks(frame: &mut Frame, area: Rect) {
    let mut lines = vec![
        Line::styled(
            "Why create an account?",
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Line::default(),
    ];
    lines.extend(
        PERKS
            .iter()
            .map(|perk| Line::from(vec![Span::styled("  ✓ ", Style::default().fg(Color::Green)), Span::raw(*perk)])),
    );
    lines.push(Line::default());
    lines.push(Line::styled(
        "Press u to sign up or i to sign in.",
        Style::default().fg(Color::DarkGray),
    ));
    frame.render_widget(Paragraph::new(lines).block(block("Perks", true)), area);
}

// Overlays

fn render_overlay(frame: &mut Frame, app: &App, overlay: &Overlay, area: Rect) {
    match overlay {
        Overlay::Notice { title, message } => {
            let lines = vec![
                Line::from(message.as_str()),
                Line::default(),
                Line::styled("Press any key", Style::default().fg(Color::DarkGray)),
            ];
            render_form(frame, title, lines, area);
        }
        Overlay::Confirm { message, .. } => {
            let lines = vec![
                Line::from(message.as_str()),
                Line::default(),
                Line::styled("y: yes  n: no", Style::default().fg(Color::Yellow)),
            ];
            render_form(frame, "Confirm", lines, area);
        }
        Overlay::AlbumPicker(picker) => {
            let saved_in: Vec<&str> = app
                .albums
                .albums_containing(&picker.recipe_id)
                .iter()
                .map(|a| a.id.as_str())
                .collect();
            let mut lines: Vec<Line> = app
                .albums
                .albums()
                .iter()
                .enumerate()
                .map(|(i, album)| {
                    let check = if saved_in.contains(&album.id.as_str()) {
                        "✓ "
                    } else {
                        "  "
                    };
                    let style = if i == picker.cursor.selected && picker.new_album.is_none() {
                        selected_style()
                    } else {
                        Style::default()
                    };
                    Line::from(vec![
                        Span::styled(check, Style::default().fg(Color::Green)),
                        swatch(&album.color),
                        Span::styled(album.name.as_str(), style),
                    ])
                })
                .collect();

            let new_row = app.albums.albums().len();
            match &picker.new_album {
                Some(name) => lines.push(field_line(name.label, name.display(), true)),
                None => {
                    let style = if picker.cursor.selected == new_row {
                        selected_style()
                    } else {
                        Style::default().fg(Color::Cyan)
                    };
                    lines.push(Line::styled("+ New album", style));
                }
            }
            render_form(frame, "Save to album", lines, area);
        }
        Overlay::AlbumCreate(form) => {
            let (color_name, hex) = ALBUM_PALETTE[form.color_index % ALBUM_PALETTE.len()];
            let mut lines = vec![
                field_line(form.name.label, form.name.display(), true),
                Line::from(vec![
                    Span::styled("  Colour: ", Style::default().fg(Color::DarkGray)),
                    swatch(hex),
                    Span::raw(format!("{color_name}  (←/→)")),
                ]),
            ];
            if let Some(error) = &form.error {
                lines.push(Line::styled(error.as_str(), Style::default().fg(Color::Red)));
            }
            render_form(frame, "New album", lines, area);
        }
        Overlay::QuickFind(find) => render_quick_find(frame, find, area),
    }
}

fn render_quick_find(frame: &mut Frame, find: &crate::app::QuickFind, area: Rect) {
    let dialog_width = 60.min(area.width.saturating_sub(4));
    let dialog_height = 15.min(area.height.saturating_sub(4));
    let dialog_area = centered_rect(dialog_width, dialog_height, area);
    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .title(" Find recipe ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta));
    let inner = block.inner(dialog_area);
    frame.render_widget(block, dialog_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(inner);

    let input = Line::from(vec![
        Span::styled("▸ ", Style::default().fg(Color::Magenta)),
        Span::styled(find.query.value.as_str(), Style::default().fg(Color::White)),
        Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
    ]);
    frame.render_widget(Paragraph::new(input), chunks[0]);

    if find.results.is_empty() {
        if !find.query.value.is_empty() {
            centered_message(frame, "No results found", chunks[1]);
        }
        return;
    }
    let recipes: Vec<&Recipe> = find.results.iter().collect();
    recipe_list(frame, &recipes, Some(find.cursor.selected), chunks[1]);
}

/// Helper to create a centered rectangle.
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use ratatui::backend::TestBackend;
    use recipebox_core::MemoryBackend;

    #[test]
    fn hex_colours() {
        assert_eq!(hex_color("#FEF3C7"), Some(Color::Rgb(0xFE, 0xF3, 0xC7)));
        assert_eq!(hex_color("FEF3C7"), None);
        assert_eq!(hex_color("#XYZXYZ"), None);
        assert_eq!(palette_name("#dbeafe"), Some("Blue"));
        assert_eq!(palette_name("#000000"), None);
    }

    #[test]
    fn fit_pads_and_cuts() {
        assert_eq!(fit("abc", 5), "abc  ");
        assert_eq!(fit("abcdef", 4), "abc…");
    }

    #[test]
    fn window_wraps_around_strip() {
        let strip: Vec<char> = "abcd".chars().collect();
        assert_eq!(window(&strip, 2, 6), "cdabcd");
        assert_eq!(window(&[], 0, 3), "");
    }

    #[test]
    fn strip_width_matches_half_width() {
        let backend = MemoryBackend::demo();
        let mut app = App::new(Box::new(backend), Config::default());
        app.start();
        let recipes = app.carousel_recipes(Lane::Top);
        let (titles, metas) = strip_lines(&recipes);
        let half = app.carousel_half_width().unwrap() as usize;
        assert_eq!(titles.len(), half);
        assert_eq!(metas.len(), half);
    }

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn album_list_names_palette_colours() {
        let mut app = App::new(Box::new(MemoryBackend::demo()), Config::default());
        app.start();
        app.navigate(Screen::Albums);
        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        terminal.draw(|frame| render(frame, &app)).unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("Weeknight favourites"));
        assert!(text.contains("2 recipes  Green"));
    }

    #[test]
    fn every_screen_renders() {
        let mut app = App::new(Box::new(MemoryBackend::demo()), Config::default());
        app.start();
        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();

        let recipe_id = app.search.catalog()[0].id.clone();
        let album_id = app.albums.albums()[0].id.clone();
        let screens = [
            Screen::Home,
            Screen::RecipeDetail(recipe_id),
            Screen::MyRecipes,
            Screen::Editor,
            Screen::Albums,
            Screen::AlbumDetail(album_id),
            Screen::Profile,
            Screen::Perks,
        ];
        for screen in screens {
            app.navigate(screen);
            app.tick(std::time::Duration::from_millis(16));
            terminal.draw(|frame| render(frame, &app)).unwrap();
        }

        app.request_save();
        terminal.draw(|frame| render(frame, &app)).unwrap();
        app.open_quick_find();
        terminal.draw(|frame| render(frame, &app)).unwrap();

        app.dismiss_overlay();
        app.logout();
        app.navigate(Screen::SignUp);
        app.sign_up.details.fields[2].value = "hunter2".into();
        terminal.draw(|frame| render(frame, &app)).unwrap();
        app.navigate(Screen::SignIn);
        terminal.draw(|frame| render(frame, &app)).unwrap();
    }
}
