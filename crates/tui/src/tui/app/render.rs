use std::cmp::min;

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap};
use ratatui::Frame;

use crate::core::{Board, JobsBoard, Panel, Snapshot, NO_JOBS};
use crate::model::Resource;
use crate::tui::constants::{
    APP_VERSION, HELP_BOARD, HELP_JOBS, HELP_PICKER, HELP_RESOURCES, STATUS_PROJECT_EDITOR,
    STATUS_TASK_EDITOR,
};
use crate::tui::helpers::{
    accent_title, build_help_lines, centered_rect, inset_rect, status_badge, status_style,
    Palette,
};

use super::{
    board_columns, App, ConfirmChoice, ConfirmTarget, InputMode, ProjectField, Surface, TaskField,
};

const LABEL_WIDTH: usize = 12;

impl App {
    pub(crate) fn draw(&mut self, f: &mut Frame<'_>) {
        let palette = self.palette();
        let size = f.size();
        f.render_widget(Clear, size);
        f.render_widget(Block::default().style(Style::default().bg(palette.base)), size);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(2),
            ])
            .split(size);

        self.draw_header(f, chunks[0], palette);
        self.draw_tabs(f, chunks[1], palette);
        self.draw_body(f, chunks[2], palette);
        self.draw_footer(f, chunks[3], palette);

        if matches!(
            self.surface,
            Surface::ProjectEditor | Surface::TaskEditor | Surface::Picker
        ) {
            if self.workbench.dialogs().project().is_some() {
                self.draw_project_editor(f, size, palette);
            }
            if self.workbench.dialogs().task().is_some() {
                self.draw_task_editor(f, size, palette);
            }
            if self.surface == Surface::Picker {
                self.draw_picker(f, size, palette);
            }
        }

        match self.input_mode {
            InputMode::Help => self.draw_help_overlay(f, size, palette),
            InputMode::Confirm => self.draw_confirm_overlay(f, size, palette),
            InputMode::Notice => self.draw_notice_overlay(f, size, palette),
            InputMode::Normal | InputMode::Search | InputMode::Jump => {}
        }
    }

    fn draw_header(&self, f: &mut Frame<'_>, area: Rect, palette: Palette) {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(area);

        let mut left_spans = vec![
            Span::styled(
                format!(" planboard v{} ", APP_VERSION),
                Style::default()
                    .fg(palette.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(
                format!("🔌 {}", self.config.store_url()),
                Style::default().fg(palette.muted),
            ),
        ];

        let filter = self.workbench.filter();
        if !filter.is_empty() {
            left_spans.push(Span::raw("  "));
            left_spans.push(Span::styled(
                format!("🔍 {}", filter),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ));
        }

        f.render_widget(
            Paragraph::new(Line::from(left_spans)).style(Style::default().bg(palette.base)),
            cols[0],
        );

        let summary = match self.workbench.snapshot() {
            Snapshot::Loaded(projects) => format!("{} projects", projects.len()),
            Snapshot::Unavailable(_) => String::from("offline"),
            Snapshot::NotLoaded => String::from("loading"),
        };
        let right = Paragraph::new(Line::from(vec![Span::styled(
            summary,
            Style::default().fg(palette.muted),
        )]))
        .alignment(Alignment::Right)
        .style(Style::default().bg(palette.base));
        f.render_widget(right, cols[1]);
    }

    fn draw_tabs(&self, f: &mut Frame<'_>, area: Rect, palette: Palette) {
        let titles: Vec<Line> = ["1 Projects", "2 Jobs", "3 Resources"]
            .into_iter()
            .map(Line::from)
            .collect();
        let selected = match self.workbench.panel() {
            Panel::None => 0,
            Panel::Jobs(_) => 1,
            Panel::Resources(_) => 2,
        };
        let tabs = Tabs::new(titles)
            .select(selected)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(accent_title("Views", palette))
                    .border_style(Style::default().fg(palette.muted))
                    .style(Style::default().bg(palette.panel).fg(palette.text)),
            )
            .highlight_style(
                Style::default()
                    .fg(palette.accent)
                    .bg(palette.highlight)
                    .add_modifier(Modifier::BOLD),
            );
        f.render_widget(tabs, area);
    }

    fn draw_body(&self, f: &mut Frame<'_>, area: Rect, palette: Palette) {
        match self.workbench.panel() {
            Panel::Jobs(jobs) => self.draw_jobs(f, area, jobs, palette),
            Panel::Resources(resources) => self.draw_resources(f, area, resources, palette),
            Panel::None => match self.workbench.board() {
                Ok(board) => self.draw_board(f, area, &board, palette),
                Err(err) => draw_placeholder(
                    f,
                    area,
                    vec![
                        Line::from(vec![Span::styled(
                            err.to_string(),
                            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                        )]),
                        Line::default(),
                        Line::from("Press 'r' to try again."),
                    ],
                    palette,
                ),
            },
        }
    }

    fn draw_board(&self, f: &mut Frame<'_>, area: Rect, board: &Board, palette: Palette) {
        if board.is_empty() {
            let heading = if self.workbench.filter().is_empty() {
                "No projects yet"
            } else {
                "Nothing matches the search"
            };
            draw_placeholder(
                f,
                area,
                vec![
                    Line::from(vec![Span::styled(
                        heading,
                        Style::default()
                            .fg(palette.accent)
                            .add_modifier(Modifier::BOLD),
                    )]),
                    Line::default(),
                    Line::from("Press 'n' to create a project, or Esc to clear the search."),
                ],
                palette,
            );
            return;
        }

        let count = board.buckets.len() as u32;
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(
                board
                    .buckets
                    .iter()
                    .map(|_| Constraint::Ratio(1, count))
                    .collect::<Vec<_>>(),
            )
            .split(area);
        let rows = board_columns(board);

        for (index, bucket) in board.buckets.iter().enumerate() {
            let mut items: Vec<ListItem> = Vec::new();
            for project in &bucket.projects {
                let mut spans = vec![Span::styled(
                    project.description.clone(),
                    Style::default()
                        .fg(palette.text)
                        .add_modifier(Modifier::BOLD),
                )];
                if let Some(date) = &project.possible_date {
                    spans.push(Span::styled(
                        format!("  📅 {date}"),
                        Style::default().fg(palette.muted),
                    ));
                }
                items.push(ListItem::new(Line::from(spans)));
                for task in &project.tasks {
                    items.push(ListItem::new(Line::from(vec![
                        Span::raw("  "),
                        Span::styled(status_badge(task.status), status_style(task.status)),
                        Span::raw(" "),
                        Span::styled(
                            format!("#{} ", task.id),
                            Style::default().fg(palette.muted),
                        ),
                        Span::styled(task.description.clone(), Style::default().fg(palette.text)),
                    ])));
                }
            }

            let active = index == self.column;
            let mut state = ListState::default();
            if active && rows.get(index).is_some_and(|column| !column.is_empty()) {
                state.select(Some(self.row));
            }
            let border_style = if active {
                Style::default().fg(palette.accent)
            } else {
                Style::default().fg(palette.muted)
            };
            let list = List::new(items)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title(accent_title(&bucket.label, palette))
                        .border_style(border_style)
                        .style(Style::default().bg(palette.panel)),
                )
                .highlight_style(
                    Style::default()
                        .bg(palette.highlight)
                        .add_modifier(Modifier::BOLD),
                )
                .highlight_symbol(if active { "▶ " } else { "  " });
            f.render_stateful_widget(list, columns[index], &mut state);
        }
    }

    fn draw_jobs(&self, f: &mut Frame<'_>, area: Rect, jobs: &JobsBoard, palette: Palette) {
        if jobs.is_empty() {
            draw_placeholder(f, area, vec![Line::from(NO_JOBS)], palette);
            return;
        }

        let block = Block::default()
            .borders(Borders::ALL)
            .title(accent_title("🧰 Jobs", palette))
            .border_style(Style::default().fg(palette.muted))
            .style(Style::default().bg(palette.panel));

        let mut items: Vec<ListItem> = Vec::new();
        let mut selected_item = None;
        let mut job_index = 0;
        for group in &jobs.groups {
            items.push(ListItem::new(Line::from(vec![Span::styled(
                group.description.clone(),
                Style::default()
                    .fg(palette.accent)
                    .add_modifier(Modifier::BOLD),
            )])));
            if group.jobs.is_empty() {
                items.push(ListItem::new(Line::from(vec![Span::styled(
                    format!("  {NO_JOBS}"),
                    Style::default().fg(palette.muted),
                )])));
            }
            for job in &group.jobs {
                if job_index == self.selected {
                    selected_item = Some(items.len());
                }
                job_index += 1;
                items.push(ListItem::new(Line::from(vec![
                    Span::styled(format!("  #{} ", job.task_id), Style::default().fg(palette.muted)),
                    Span::styled(job.description.clone(), Style::default().fg(palette.text)),
                    Span::styled(
                        format!("  {} · {}", job.project_description, job.status),
                        Style::default().fg(palette.muted),
                    ),
                ])));
            }
        }

        let mut state = ListState::default();
        state.select(selected_item);
        let list = List::new(items)
            .block(block)
            .highlight_style(
                Style::default()
                    .bg(palette.highlight)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");
        f.render_stateful_widget(list, area, &mut state);
    }

    fn draw_resources(
        &self,
        f: &mut Frame<'_>,
        area: Rect,
        resources: &[Resource],
        palette: Palette,
    ) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(3)])
            .split(area);

        let input_block = Block::default()
            .borders(Borders::ALL)
            .title(accent_title("➕ New resource", palette))
            .border_style(Style::default().fg(palette.accent))
            .style(Style::default().bg(palette.panel));
        let input_area = input_block.inner(chunks[0]);
        f.render_widget(input_block, chunks[0]);
        f.render_widget(
            Paragraph::new(self.field.as_str()).style(Style::default().fg(palette.text)),
            input_area,
        );
        if self.input_mode == InputMode::Normal {
            set_cursor_after(f, input_area, self.field.before_cursor());
        }

        let items: Vec<ListItem> = if resources.is_empty() {
            vec![ListItem::new(Line::from(vec![Span::styled(
                "No resources yet",
                Style::default().fg(palette.muted),
            )]))]
        } else {
            resources
                .iter()
                .map(|resource| {
                    ListItem::new(Line::from(vec![
                        Span::styled(format!("#{} ", resource.id), Style::default().fg(palette.muted)),
                        Span::styled(resource.description.clone(), Style::default().fg(palette.text)),
                    ]))
                })
                .collect()
        };

        let mut state = ListState::default();
        if !resources.is_empty() {
            state.select(Some(self.selected));
        }
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(accent_title("👷 Resources", palette))
                    .border_style(Style::default().fg(palette.muted))
                    .style(Style::default().bg(palette.panel)),
            )
            .highlight_style(
                Style::default()
                    .bg(palette.highlight)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");
        f.render_stateful_widget(list, chunks[1], &mut state);
    }

    fn draw_footer(&self, f: &mut Frame<'_>, area: Rect, palette: Palette) {
        let lines = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(1)])
            .split(area);

        match self.input_mode {
            InputMode::Search | InputMode::Jump => {
                let prompt = if self.input_mode == InputMode::Search {
                    "/"
                } else {
                    ":"
                };
                let line = Line::from(vec![
                    Span::styled(prompt, Style::default().fg(Color::Yellow)),
                    Span::styled(self.field.as_str(), Style::default().fg(palette.text)),
                ]);
                f.render_widget(Paragraph::new(line), lines[0]);
                let x = lines[0].x + 1 + self.field.before_cursor().chars().count() as u16;
                f.set_cursor(min(x, lines[0].right().saturating_sub(1)), lines[0].y);
            }
            _ => {
                let status_line = match &self.status {
                    Some(status) => Line::from(vec![Span::styled(status.text.clone(), status.style())]),
                    None => Line::from(vec![Span::styled("Ready", Style::default().fg(palette.text))]),
                };
                f.render_widget(Paragraph::new(status_line), lines[0]);
            }
        }

        let help = match self.input_mode {
            InputMode::Search => "Enter keep • Esc clear",
            InputMode::Jump => "Enter open • Esc cancel",
            InputMode::Help => "Enter/Esc to close ❔",
            InputMode::Confirm => "←/→ choose • y/n • Enter confirm • Esc cancel",
            InputMode::Notice => "Any key to dismiss",
            InputMode::Normal => match self.surface {
                Surface::Board => HELP_BOARD,
                Surface::Jobs => HELP_JOBS,
                Surface::Resources => HELP_RESOURCES,
                Surface::Picker => HELP_PICKER,
                Surface::ProjectEditor => STATUS_PROJECT_EDITOR,
                Surface::TaskEditor => STATUS_TASK_EDITOR,
            },
        };
        f.render_widget(
            Paragraph::new(Line::from(vec![Span::styled(
                help,
                Style::default().fg(palette.muted),
            )])),
            lines[1],
        );
    }

    fn draw_project_editor(&self, f: &mut Frame<'_>, area: Rect, palette: Palette) {
        let Some(editor) = self.workbench.dialogs().project() else {
            return;
        };
        let editing = self.surface == Surface::ProjectEditor;
        let width = min(area.width.saturating_sub(8), 80);
        let height = min(area.height.saturating_sub(2), 20);
        let popup = centered_rect(width, height, area);
        f.render_widget(Clear, popup);

        let title = match editor.id() {
            Some(id) => format!("📁 Project #{id}"),
            None => String::from("📁 New Project"),
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(accent_title(&title, palette))
            .border_style(Style::default().fg(if editing {
                palette.accent
            } else {
                palette.muted
            }))
            .style(Style::default().bg(palette.panel));
        let inner = inset_rect(block.inner(popup), 1);
        f.render_widget(block, popup);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(3)])
            .split(inner);

        let focused = editing.then(|| self.project_field());
        let form = &editor.form;
        let values = [
            (ProjectField::Name, "Name", form.name.as_str()),
            (ProjectField::Bucket, "Bucket", form.bucket.as_str()),
            (ProjectField::Notes, "Notes", form.notes.as_str()),
        ];
        let mut lines = Vec::with_capacity(values.len());
        for (row, (field, label, value)) in values.into_iter().enumerate() {
            let is_focused = focused == Some(field);
            let text = if is_focused { self.field.as_str() } else { value };
            lines.push(field_line(label, text, is_focused, palette));
            if is_focused && self.input_mode == InputMode::Normal {
                let line_area = Rect {
                    y: chunks[0].y + row as u16,
                    height: 1,
                    ..chunks[0]
                };
                set_cursor_after(f, offset_label(line_area), self.field.before_cursor());
            }
        }
        f.render_widget(Paragraph::new(lines), chunks[0]);

        let tasks_focused = focused == Some(ProjectField::Tasks);
        let items: Vec<ListItem> = if editor.tasks().is_empty() {
            let hint = if editor.id().is_some() {
                "No tasks yet. Ctrl+N adds one."
            } else {
                "Save the project before adding tasks."
            };
            vec![ListItem::new(Line::from(vec![Span::styled(
                hint,
                Style::default().fg(palette.muted),
            )]))]
        } else {
            editor
                .tasks()
                .iter()
                .map(|task| {
                    ListItem::new(Line::from(vec![
                        Span::styled(status_badge(task.status), status_style(task.status)),
                        Span::styled(format!(" #{} ", task.id), Style::default().fg(palette.muted)),
                        Span::styled(task.description.clone(), Style::default().fg(palette.text)),
                        Span::styled(
                            format!("  {}", task.progress()),
                            Style::default().fg(palette.muted),
                        ),
                    ]))
                })
                .collect()
        };
        let mut state = ListState::default();
        if tasks_focused && !editor.tasks().is_empty() {
            state.select(Some(self.selected));
        }
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .title(Span::styled(
                        "Tasks",
                        label_style(tasks_focused, palette),
                    ))
                    .border_style(Style::default().fg(palette.muted)),
            )
            .highlight_style(
                Style::default()
                    .bg(palette.highlight)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");
        f.render_stateful_widget(list, chunks[1], &mut state);
    }

    fn draw_task_editor(&self, f: &mut Frame<'_>, area: Rect, palette: Palette) {
        let Some(editor) = self.workbench.dialogs().task() else {
            return;
        };
        let editing = self.surface == Surface::TaskEditor;
        let width = min(area.width.saturating_sub(4), 76);
        let height = min(area.height.saturating_sub(2), 18);
        let popup = centered_rect(width, height, area);
        f.render_widget(Clear, popup);

        let title = match editor.id() {
            Some(id) => format!("📝 Task #{id}"),
            None => String::from("📝 New Task"),
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(accent_title(&title, palette))
            .border_style(Style::default().fg(if editing {
                palette.accent
            } else {
                palette.muted
            }))
            .style(Style::default().bg(palette.panel));
        let inner = inset_rect(block.inner(popup), 1);
        f.render_widget(block, popup);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(5),
                Constraint::Min(3),
            ])
            .split(inner);

        let progress = editor.progress();
        let mut status_spans = vec![Span::styled(
            progress.to_string(),
            Style::default()
                .fg(palette.text)
                .add_modifier(Modifier::BOLD),
        )];
        if editor.can_start() {
            status_spans.push(Span::styled(
                "  Ctrl+T start now",
                Style::default().fg(palette.muted),
            ));
        }
        if editor.can_finish() {
            status_spans.push(Span::styled(
                "  Ctrl+F finish now",
                Style::default().fg(palette.muted),
            ));
        }
        f.render_widget(Paragraph::new(Line::from(status_spans)), chunks[0]);

        let focused = editing.then(|| self.task_field());
        let form = &editor.form;
        let project = editor
            .projects()
            .iter()
            .find(|(id, _)| *id == form.project_id)
            .map(|(_, name)| name.clone())
            .unwrap_or_else(|| format!("#{}", form.project_id));
        let dependency = match form.dependency() {
            Some(id) => editor
                .siblings()
                .iter()
                .find(|task| task.id == id)
                .map(|task| format!("#{} {}", task.id, task.description))
                .unwrap_or_else(|| format!("#{id}")),
            None => String::from("None"),
        };

        let rows = [
            (TaskField::Name, "Name", form.name.clone(), true),
            (TaskField::Project, "Project", format!("‹ {project} ›"), false),
            (TaskField::Notes, "Notes", form.notes.clone(), true),
            (TaskField::Duration, "Days", form.duration.clone(), true),
            (TaskField::Dependency, "After", format!("‹ {dependency} ›"), false),
        ];
        let mut lines = Vec::with_capacity(rows.len());
        for (row, (field, label, value, editable)) in rows.into_iter().enumerate() {
            let is_focused = focused == Some(field);
            let text = if is_focused && editable {
                self.field.as_str().to_string()
            } else {
                value
            };
            lines.push(field_line(label, &text, is_focused, palette));
            if is_focused && editable && self.input_mode == InputMode::Normal {
                let line_area = Rect {
                    y: chunks[1].y + row as u16,
                    height: 1,
                    ..chunks[1]
                };
                set_cursor_after(f, offset_label(line_area), self.field.before_cursor());
            }
        }
        f.render_widget(Paragraph::new(lines), chunks[1]);

        let resources_focused = focused == Some(TaskField::Resources);
        let assigned = editor.resources().resources();
        let items: Vec<ListItem> = if assigned.is_empty() {
            vec![ListItem::new(Line::from(vec![Span::styled(
                "No resources. Ctrl+R adds one.",
                Style::default().fg(palette.muted),
            )]))]
        } else {
            assigned
                .iter()
                .map(|resource| {
                    ListItem::new(Line::from(vec![
                        Span::styled(format!("#{} ", resource.id), Style::default().fg(palette.muted)),
                        Span::styled(resource.description.clone(), Style::default().fg(palette.text)),
                    ]))
                })
                .collect()
        };
        let mut state = ListState::default();
        if resources_focused && !assigned.is_empty() {
            state.select(Some(self.selected));
        }
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .title(Span::styled(
                        "Resources",
                        label_style(resources_focused, palette),
                    ))
                    .border_style(Style::default().fg(palette.muted)),
            )
            .highlight_style(
                Style::default()
                    .bg(palette.highlight)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");
        f.render_stateful_widget(list, chunks[2], &mut state);
    }

    fn draw_picker(&self, f: &mut Frame<'_>, area: Rect, palette: Palette) {
        let Some(picker) = self.workbench.dialogs().picker() else {
            return;
        };
        let candidates = picker.candidates();
        let width = min(area.width.saturating_sub(20), 44).max(24);
        let height = min(candidates.len() as u16 + 4, area.height.saturating_sub(4)).max(5);
        let popup = centered_rect(width, height, area);
        f.render_widget(Clear, popup);

        let items: Vec<ListItem> = if candidates.is_empty() {
            vec![ListItem::new(Line::from(vec![Span::styled(
                "Every resource is already assigned",
                Style::default().fg(palette.muted),
            )]))]
        } else {
            candidates
                .iter()
                .map(|resource| ListItem::new(resource.description.clone()))
                .collect()
        };
        let mut state = ListState::default();
        if !candidates.is_empty() {
            state.select(Some(self.picker_selected));
        }
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(accent_title("👷 Add Resource", palette))
                    .border_style(Style::default().fg(palette.accent))
                    .style(Style::default().bg(palette.panel).fg(palette.text)),
            )
            .highlight_style(
                Style::default()
                    .bg(palette.highlight)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");
        f.render_stateful_widget(list, popup, &mut state);
    }

    fn draw_help_overlay(&self, f: &mut Frame<'_>, area: Rect, palette: Palette) {
        let lines = build_help_lines();
        let width = min(area.width.saturating_sub(10), 80);
        let height = min(lines.len() as u16 + 4, area.height.saturating_sub(2)).max(10);
        let popup_area = centered_rect(width, height, area);
        f.render_widget(Clear, popup_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(accent_title("⌨️ Keyboard Reference", palette))
            .border_style(Style::default().fg(palette.muted))
            .style(Style::default().bg(palette.panel));
        let inner = block.inner(popup_area);
        f.render_widget(block, popup_area);

        if inner.width < 3 || inner.height < 3 {
            return;
        }

        let help_lines: Vec<Line> = lines
            .into_iter()
            .map(|(combo, desc)| {
                Line::from(vec![
                    Span::styled(format!("{combo:<18}"), Style::default().fg(palette.accent)),
                    Span::styled(desc, Style::default().fg(palette.text)),
                ])
            })
            .collect();

        f.render_widget(
            Paragraph::new(help_lines).wrap(Wrap { trim: true }),
            inset_rect(inner, 1),
        );
    }

    fn confirm_subject(&self, target: ConfirmTarget) -> String {
        let dialogs = self.workbench.dialogs();
        match target {
            ConfirmTarget::Project => dialogs
                .project()
                .map(|editor| format!("project '{}'", editor.form.name))
                .unwrap_or_else(|| String::from("this project")),
            ConfirmTarget::Task => dialogs
                .task()
                .map(|editor| format!("task '{}'", editor.form.name))
                .unwrap_or_else(|| String::from("this task")),
            ConfirmTarget::ProjectTask(id) => dialogs
                .project()
                .and_then(|editor| editor.tasks().iter().find(|task| task.id == id))
                .map(|task| format!("task '{}'", task.description))
                .unwrap_or_else(|| format!("task #{id}")),
            ConfirmTarget::Resource(id) => match self.workbench.panel() {
                Panel::Resources(list) => list
                    .iter()
                    .find(|resource| resource.id == id)
                    .map(|resource| format!("resource '{}'", resource.description))
                    .unwrap_or_else(|| format!("resource #{id}")),
                _ => format!("resource #{id}"),
            },
        }
    }

    fn draw_confirm_overlay(&self, f: &mut Frame<'_>, area: Rect, palette: Palette) {
        let Some(target) = self.confirm else {
            return;
        };
        let width = min(area.width.saturating_sub(20), 60).max(40);
        let popup_area = centered_rect(width, 8, area);
        f.render_widget(Clear, popup_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(accent_title("🗑 Confirm Deletion", palette))
            .border_style(Style::default().fg(Color::Red))
            .style(Style::default().bg(palette.panel));
        let inner = block.inner(popup_area);
        f.render_widget(block, popup_area);

        let yes_style = if self.confirm_choice == ConfirmChoice::Yes {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Red)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Red)
        };
        let no_style = if self.confirm_choice == ConfirmChoice::No {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Gray)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };

        let lines = vec![
            Line::from(vec![Span::styled(
                "This action cannot be undone.",
                Style::default().fg(Color::Red),
            )]),
            Line::from(vec![Span::styled(
                format!("Delete {}?", self.confirm_subject(target)),
                Style::default().fg(palette.text),
            )]),
            Line::default(),
            Line::from(vec![
                Span::styled("  Yes  ", yes_style),
                Span::raw("    "),
                Span::styled("  No  ", no_style),
            ]),
        ];

        f.render_widget(
            Paragraph::new(lines)
                .wrap(Wrap { trim: true })
                .alignment(Alignment::Center),
            inset_rect(inner, 1),
        );
    }

    fn draw_notice_overlay(&self, f: &mut Frame<'_>, area: Rect, palette: Palette) {
        let Some(message) = &self.notice else {
            return;
        };
        let width = min(area.width.saturating_sub(16), 64).max(30);
        let popup_area = centered_rect(width, 7, area);
        f.render_widget(Clear, popup_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(accent_title("⚠️ Problem", palette))
            .border_style(Style::default().fg(Color::Red))
            .style(Style::default().bg(palette.panel));
        let inner = block.inner(popup_area);
        f.render_widget(block, popup_area);

        let lines = vec![
            Line::from(vec![Span::styled(
                message.clone(),
                Style::default().fg(palette.text),
            )]),
            Line::default(),
            Line::from(vec![Span::styled(
                "Press any key",
                Style::default().fg(palette.muted),
            )]),
        ];
        f.render_widget(
            Paragraph::new(lines)
                .wrap(Wrap { trim: true })
                .alignment(Alignment::Center),
            inset_rect(inner, 1),
        );
    }
}

fn draw_placeholder(f: &mut Frame<'_>, area: Rect, lines: Vec<Line<'static>>, palette: Palette) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.muted))
        .style(Style::default().bg(palette.panel).fg(palette.text));
    let inner = block.inner(area);
    f.render_widget(Clear, area);
    f.render_widget(block, area);

    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let width = inner.width.min(80).max(1);
    let height = (lines.len() as u16).saturating_add(2).min(inner.height);
    let content_area = centered_rect(width, height, inner);
    f.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .alignment(Alignment::Center),
        content_area,
    );
}

fn label_style(focused: bool, palette: Palette) -> Style {
    if focused {
        Style::default()
            .fg(palette.accent)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(palette.muted)
    }
}

fn field_line<'a>(label: &str, value: &str, focused: bool, palette: Palette) -> Line<'a> {
    let value_style = if focused {
        Style::default().fg(palette.text).bg(palette.highlight)
    } else {
        Style::default().fg(palette.text)
    };
    Line::from(vec![
        Span::styled(
            format!("{label:<width$}", width = LABEL_WIDTH),
            label_style(focused, palette),
        ),
        Span::styled(value.to_string(), value_style),
    ])
}

fn offset_label(area: Rect) -> Rect {
    let shift = min(LABEL_WIDTH as u16, area.width);
    Rect {
        x: area.x + shift,
        width: area.width - shift,
        ..area
    }
}

fn set_cursor_after(f: &mut Frame<'_>, area: Rect, before: &str) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    let offset = min(before.chars().count() as u16, area.width - 1);
    f.set_cursor(area.x + offset, area.y);
}
