use crate::models::Expense;
use crate::views::{self, Page};

const EMBED_OPEN: &str = r#"<script type="application/json" id="initial-expenses">"#;
const EMBED_CLOSE: &str = "</script>";

/// Builds the page with `expenses` embedded as JSON and pre-rendered views.
pub fn render_index(expenses: &[Expense]) -> String {
    let page = Page::render(expenses);
    let options: String = crate::models::Category::ALL
        .iter()
        .map(|category| format!(r#"<option value="{category}">{category}</option>"#))
        .collect();

    fill(
        INDEX_HTML,
        &[
            ("TOTAL", page.summary.display),
            ("CATEGORY_OPTIONS", options),
            ("CHART", views::donut_svg(&page.chart)),
            ("LIST", views::list_html(&page.list)),
            ("INITIAL_EXPENSES", embed_json(expenses)),
        ],
    )
}

/// Substitutes `{{KEY}}` placeholders in a single pass over the template, so
/// user text inside a value is never itself treated as a placeholder.
fn fill(template: &str, values: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };
        let key = &after[..end];
        match values.iter().find(|(name, _)| *name == key) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[start..start + end + 4]),
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

/// Serializes the collection so it can sit inside a `<script>` element.
pub fn embed_json(expenses: &[Expense]) -> String {
    let json = serde_json::to_string(expenses).unwrap_or_else(|_| "[]".to_string());
    json.replace('<', "\\u003c")
}

/// Returns the JSON text embedded by [`render_index`].
pub fn extract_embedded(html: &str) -> Option<&str> {
    let start = html.find(EMBED_OPEN)? + EMBED_OPEN.len();
    let len = html[start..].find(EMBED_CLOSE)?;
    Some(html[start..start + len].trim())
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Expense Tracker</title>
  <link rel="stylesheet" href="style.css" />
</head>
<body>
  <main class="app">
    <header>
      <h1>My Expense Tracker</h1>
      <p class="subtitle">Every change is saved to the server as soon as it is made.</p>
    </header>

    <div class="layout">
      <div class="column">
        <section class="panel">
          <h2>Total Expenses</h2>
          <div class="total" id="total-expenses">{{TOTAL}}</div>
        </section>

        <section class="panel">
          <h2>Add New Expense</h2>
          <form id="expense-form" class="expense-form">
            <label for="description">Description</label>
            <input type="text" id="description" name="description" placeholder="e.g., Coffee" required />

            <label for="amount">Amount</label>
            <input type="number" id="amount" name="amount" min="0.01" step="0.01" placeholder="e.g., 4.50" required />

            <label for="category">Category</label>
            <select id="category" name="category">{{CATEGORY_OPTIONS}}</select>

            <label for="date">Date</label>
            <input type="date" id="date" name="date" required />

            <button class="btn-add" type="submit">Add Expense</button>
          </form>
        </section>
      </div>

      <div class="column wide">
        <section class="panel">
          <h2>Spending by Category</h2>
          <div class="chart-card" id="category-chart">{{CHART}}</div>
        </section>

        <section class="panel">
          <h2>Expense History</h2>
          <div id="expense-list" class="expense-list">{{LIST}}</div>
        </section>
      </div>
    </div>
  </main>

  <script type="application/json" id="initial-expenses">{{INITIAL_EXPENSES}}</script>
  <script src="script.js"></script>
</body>
</html>
"#;

pub const STYLE_CSS: &str = r#"@import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

:root {
  --bg-1: #f8f3e6;
  --bg-2: #f5d3a7;
  --ink: #2b2a28;
  --muted: #5f5c57;
  --accent: #3b82f6;
  --danger: #ef4444;
  --card: rgba(255, 255, 255, 0.86);
  --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
}

* {
  box-sizing: border-box;
}

body {
  margin: 0;
  min-height: 100vh;
  background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
    linear-gradient(135deg, var(--bg-1), #ffe9d4 60%, #f9f2e9 100%);
  color: var(--ink);
  font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
  padding: 32px 18px 48px;
}

.app {
  width: min(1100px, 100%);
  margin: 0 auto;
  display: grid;
  gap: 28px;
}

h1 {
  font-family: "Fraunces", "Georgia", serif;
  font-weight: 600;
  font-size: clamp(2rem, 4vw, 2.8rem);
  margin: 0;
  text-align: center;
}

h2 {
  margin: 0 0 16px;
  font-size: 1.2rem;
}

.subtitle {
  margin: 6px 0 0;
  color: var(--muted);
  text-align: center;
}

.layout {
  display: grid;
  grid-template-columns: 1fr 2fr;
  gap: 24px;
}

.column {
  display: grid;
  gap: 24px;
  align-content: start;
}

.panel {
  background: var(--card);
  backdrop-filter: blur(12px);
  border-radius: 20px;
  box-shadow: var(--shadow);
  padding: 24px;
}

.total {
  font-size: 2.4rem;
  font-weight: 600;
  color: var(--accent);
}

.expense-form {
  display: grid;
  gap: 8px;
}

.expense-form input,
.expense-form select {
  padding: 10px 12px;
  border: 1px solid #d6d0c4;
  border-radius: 10px;
  font: inherit;
  background: #fff;
}

.btn-add {
  margin-top: 12px;
  padding: 12px;
  border: none;
  border-radius: 12px;
  background: var(--accent);
  color: #fff;
  font: inherit;
  font-weight: 600;
  cursor: pointer;
}

.chart-card svg {
  width: 100%;
  max-height: 360px;
}

.chart-empty,
.chart-legend {
  font-size: 13px;
  fill: var(--muted);
}

.expense-list {
  display: grid;
  gap: 10px;
  max-height: 400px;
  overflow-y: auto;
}

.expense-item {
  display: flex;
  justify-content: space-between;
  align-items: center;
  padding: 12px 14px;
  border-radius: 12px;
  background: #fff;
}

.expense-description {
  font-weight: 600;
}

.expense-meta {
  display: flex;
  gap: 8px;
  color: var(--muted);
  font-size: 0.85rem;
}

.badge {
  background: #dbeafe;
  color: #1e40af;
  padding: 1px 8px;
  border-radius: 6px;
}

.expense-side {
  display: flex;
  align-items: center;
  gap: 14px;
}

.expense-amount {
  font-weight: 600;
  font-size: 1.1rem;
}

.delete-btn {
  border: none;
  background: none;
  color: var(--danger);
  font-size: 1.4rem;
  cursor: pointer;
}

.empty-state {
  color: var(--muted);
  text-align: center;
  padding: 16px 0;
}

@media (max-width: 760px) {
  .layout {
    grid-template-columns: 1fr;
  }
}
"#;

pub const SCRIPT_JS: &str = r#"(() => {
  const PALETTE = ['#3b82f6', '#ef4444', '#22c55e', '#eab308', '#a855f7', '#ec4899'];
  const CATEGORIES = ['Food', 'Transport', 'Utilities', 'Entertainment', 'Shopping', 'Other'];
  const EMPTY_PLACEHOLDER = 'No expenses added yet.';

  const form = document.getElementById('expense-form');
  const listEl = document.getElementById('expense-list');
  const totalEl = document.getElementById('total-expenses');
  const chartEl = document.getElementById('category-chart');
  const dateInput = document.getElementById('date');

  let expenses = JSON.parse(document.getElementById('initial-expenses').textContent || '[]');

  const cents = (amount) => Math.round(Number(amount) * 100);
  const money = (centsValue) => `$${(centsValue / 100).toFixed(2)}`;

  const escapeHtml = (text) =>
    String(text)
      .replace(/&/g, '&amp;')
      .replace(/</g, '&lt;')
      .replace(/>/g, '&gt;')
      .replace(/"/g, '&quot;')
      .replace(/'/g, '&#39;');

  const newId = () =>
    window.crypto && window.crypto.randomUUID
      ? window.crypto.randomUUID()
      : `${Date.now().toString(36)}-${Math.random().toString(36).slice(2)}`;

  const formatDate = (iso) => {
    const [year, month, day] = iso.split('-').map(Number);
    return new Date(year, month - 1, day).toLocaleDateString();
  };

  const renderList = () => {
    if (expenses.length === 0) {
      listEl.innerHTML = `<p class="empty-state">${EMPTY_PLACEHOLDER}</p>`;
      return;
    }
    const sorted = [...expenses].sort((a, b) => (a.date < b.date ? 1 : a.date > b.date ? -1 : 0));
    listEl.innerHTML = sorted
      .map(
        (expense) => `<div class="expense-item">
  <div class="expense-main">
    <div class="expense-description">${escapeHtml(expense.description)}</div>
    <div class="expense-meta"><span class="badge">${escapeHtml(expense.category)}</span><time datetime="${expense.date}">${formatDate(expense.date)}</time></div>
  </div>
  <div class="expense-side">
    <span class="expense-amount">${money(cents(expense.amount))}</span>
    <button class="delete-btn" type="button" data-id="${escapeHtml(expense.id)}" aria-label="Delete expense">&times;</button>
  </div>
</div>`
      )
      .join('');
  };

  const renderSummary = () => {
    const total = expenses.reduce((acc, expense) => acc + cents(expense.amount), 0);
    totalEl.textContent = money(total);
  };

  const renderChart = () => {
    const groups = [];
    expenses.forEach((expense) => {
      const group = groups.find((entry) => entry.category === expense.category);
      if (group) {
        group.total += cents(expense.amount);
      } else {
        groups.push({ category: expense.category, total: cents(expense.amount) });
      }
    });

    if (!groups.length) {
      chartEl.innerHTML =
        '<svg class="chart" viewBox="0 0 220 220" role="img" aria-label="Spending by category"><text class="chart-empty" x="110" y="114" text-anchor="middle">No data yet</text></svg>';
      return;
    }

    const grand = groups.reduce((acc, group) => acc + group.total, 0);
    const radius = 80;
    const circumference = 2 * Math.PI * radius;
    let offset = 0;
    let arcs = '';
    let legend = '';
    groups.forEach((group, index) => {
      const color = PALETTE[index % PALETTE.length];
      const length = grand === 0 ? 0 : (group.total / grand) * circumference;
      const label = `${escapeHtml(group.category)} ${money(group.total)}`;
      arcs += `<circle cx="110" cy="110" r="${radius}" fill="none" stroke="${color}" stroke-width="36" stroke-dasharray="${length.toFixed(3)} ${(circumference - length).toFixed(3)}" stroke-dashoffset="${(-offset).toFixed(3)}" transform="rotate(-90 110 110)"><title>${label}</title></circle>`;
      const y = 236 + index * 22;
      legend += `<rect x="40" y="${y - 10}" width="12" height="12" fill="${color}"/><text class="chart-legend" x="60" y="${y}">${label}</text>`;
      offset += length;
    });
    chartEl.innerHTML = `<svg class="chart" viewBox="0 0 220 ${230 + groups.length * 22}" role="img" aria-label="Spending by category">${arcs}${legend}</svg>`;
  };

  const renderAll = () => {
    renderList();
    renderSummary();
    renderChart();
  };

  const persist = async () => {
    try {
      const res = await fetch('api/expenses', {
        method: 'POST',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify(expenses)
      });
      if (!res.ok) {
        const ack = await res.json().catch(() => ({}));
        console.error('Error saving data:', ack.message || res.status);
      }
    } catch (err) {
      console.error('Network error while saving data:', err);
    }
  };

  const setDateToToday = () => {
    const now = new Date();
    const local = new Date(now.getTime() - now.getTimezoneOffset() * 60000);
    dateInput.value = local.toISOString().split('T')[0];
  };

  form.addEventListener('submit', (event) => {
    event.preventDefault();
    const description = document.getElementById('description').value.trim();
    const amount = parseFloat(document.getElementById('amount').value);
    const category = document.getElementById('category').value;
    const date = dateInput.value;

    if (!description || !date || !CATEGORIES.includes(category) || !(amount > 0)) {
      console.warn('Please fill out all fields.');
      return;
    }

    expenses.push({ id: newId(), description, amount, category, date });
    renderAll();
    form.reset();
    setDateToToday();
    persist();
  });

  listEl.addEventListener('click', (event) => {
    const button = event.target.closest('.delete-btn');
    if (!button) {
      return;
    }
    const id = button.dataset.id;
    expenses = expenses.filter((expense) => expense.id !== id);
    renderAll();
    persist();
  });

  renderAll();
  setDateToToday();
})();
"#;
