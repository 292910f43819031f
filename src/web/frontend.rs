//! Embedded HTML/CSS/JS frontend for the lapdash web dashboard.
//!
//! The page is compiled into the binary as a string constant. Panels arrive
//! already rendered as view-models from `/view/*`; chart slots carry
//! Chart.js configurations, so Chart.js is the only external asset.

/// The complete single-page dashboard HTML.
pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="zh-CN">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>笔记本电脑市场分析</title>
<script src="https://cdn.jsdelivr.net/npm/chart.js@4.4.1/dist/chart.umd.min.js"></script>
<style>
:root {
  --bg: #0d1117;
  --surface: #161b22;
  --border: #30363d;
  --text: #e6edf3;
  --text-muted: #8b949e;
  --accent: #58a6ff;
  --green: #3fb950;
  --yellow: #d29922;
  --red: #f85149;
  --radius: 8px;
  --font: -apple-system, BlinkMacSystemFont, 'Segoe UI', 'PingFang SC', 'Microsoft YaHei', sans-serif;
}

* { margin: 0; padding: 0; box-sizing: border-box; }
body {
  background: var(--bg);
  color: var(--text);
  font-family: var(--font);
  font-size: 14px;
  line-height: 1.5;
}

.app { max-width: 1200px; margin: 0 auto; padding: 24px; }

header {
  display: flex;
  align-items: center;
  justify-content: space-between;
  margin-bottom: 24px;
  padding-bottom: 16px;
  border-bottom: 1px solid var(--border);
}
header h1 { font-size: 22px; font-weight: 600; }
header .subtitle { color: var(--text-muted); font-size: 13px; }

.badge {
  padding: 3px 10px;
  border-radius: 12px;
  font-size: 12px;
  border: 1px solid var(--border);
  color: var(--text-muted);
}
.badge.ok { color: var(--green); border-color: var(--green); }
.badge.fail { color: var(--red); border-color: var(--red); }

.card {
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 16px;
  margin-bottom: 16px;
}
.card h2 { font-size: 16px; margin-bottom: 12px; }
.muted { color: var(--text-muted); }
.hidden { display: none !important; }

.stats { display: grid; grid-template-columns: repeat(4, 1fr); gap: 12px; }
.stat .value { font-size: 22px; font-weight: 600; }
.stat .label { color: var(--text-muted); font-size: 12px; }

.progress { height: 6px; background: var(--border); border-radius: 3px; overflow: hidden; margin: 8px 0 4px; }
.progress-bar { height: 100%; width: 0; background: var(--accent); transition: width .2s; }

table { width: 100%; border-collapse: collapse; }
th, td { text-align: left; padding: 6px 8px; border-bottom: 1px solid var(--border); }
th { color: var(--text-muted); font-weight: 500; font-size: 12px; }
.share-bar { height: 6px; background: var(--accent); border-radius: 3px; }

.tabs { display: flex; gap: 4px; border-bottom: 1px solid var(--border); margin-bottom: 12px; }
.tab {
  background: none;
  border: none;
  color: var(--text-muted);
  padding: 8px 12px;
  cursor: pointer;
  font: inherit;
  border-bottom: 2px solid transparent;
}
.tab.active { color: var(--text); border-bottom-color: var(--accent); }

.chart-box { position: relative; height: 320px; }
.chart-box .placeholder {
  position: absolute;
  inset: 0;
  display: flex;
  align-items: center;
  justify-content: center;
  color: var(--text-muted);
}

form.filters { display: flex; gap: 8px; align-items: center; margin-bottom: 12px; flex-wrap: wrap; }
select, input, button.primary {
  background: var(--bg);
  color: var(--text);
  border: 1px solid var(--border);
  border-radius: 6px;
  padding: 6px 10px;
  font: inherit;
}
button.primary { background: var(--accent); color: #0d1117; border: none; cursor: pointer; }
.spinner { color: var(--text-muted); }

.diff-positive { color: var(--green); }
.diff-negative { color: var(--red); }
.text-red-500 { color: var(--red); }
.text-green-500 { color: var(--green); }
.text-yellow-500 { color: var(--yellow); }

.competitors { display: grid; grid-template-columns: repeat(3, 1fr); gap: 12px; margin-top: 12px; }
.competitor { border: 1px solid var(--border); border-radius: var(--radius); padding: 10px; }

.sentiment-row { display: flex; align-items: center; gap: 8px; margin: 6px 0; }
.sentiment-row .label { width: 72px; }
.sentiment-row .track { flex: 1; height: 10px; background: var(--border); border-radius: 5px; overflow: hidden; }
.sentiment-row .fill { height: 100%; }
.fill.positive { background: var(--green); }
.fill.neutral { background: var(--yellow); }
.fill.negative { background: var(--red); }
.keyword { display: inline-block; padding: 2px 8px; margin: 2px; border-radius: 10px; border: 1px solid var(--border); }
.stars { color: var(--yellow); letter-spacing: 2px; }

.clusters { display: grid; grid-template-columns: repeat(3, 1fr); gap: 12px; margin-bottom: 12px; }
.cluster { border: 1px solid var(--border); border-radius: var(--radius); padding: 10px; }
.cluster-badge { font-size: 12px; padding: 1px 8px; border-radius: 10px; margin-left: 6px; }
.cluster-badge.economy { background: #1f6f43; }
.cluster-badge.premium { background: #7a3e9d; }
.cluster-badge.mainstream { background: #1f4e8c; }

@media (max-width: 800px) {
  .stats, .competitors, .clusters { grid-template-columns: 1fr; }
}
</style>
</head>
<body>
<div class="app">
  <header>
    <div>
      <h1>笔记本电脑市场分析</h1>
      <div class="subtitle" id="backend"></div>
    </div>
    <span class="badge" id="health">检查中…</span>
  </header>

  <section class="card">
    <h2>市场概览</h2>
    <div class="progress"><div class="progress-bar" id="progressBar"></div></div>
    <div class="muted" id="progressStatus"></div>
    <div class="stats" style="margin-top:12px">
      <div class="stat"><div class="value" id="totalProducts">0</div><div class="label">商品总数</div></div>
      <div class="stat"><div class="value" id="avgPrice">¥0.00</div><div class="label">平均价格</div></div>
      <div class="stat"><div class="value" id="totalSales">0</div><div class="label">总销量</div></div>
      <div class="stat"><div class="value" id="totalBrands">0</div><div class="label">品牌数量</div></div>
    </div>
  </section>

  <section class="card">
    <div class="tabs" data-group="charts"></div>
    <div data-panel="price-distribution"><div class="chart-box" data-slot="priceDistributionChart"></div></div>
    <div data-panel="brand-share"><div class="chart-box" data-slot="brandMarketShareChart"></div></div>
    <div data-panel="price-sales">
      <div class="chart-box" data-slot="priceSalesRelationshipChart"></div>
      <div class="muted">相关系数: <span id="correlation">--</span></div>
    </div>
    <div data-panel="ram-distribution"><div class="chart-box" data-slot="ramDistributionChart"></div></div>
    <div data-panel="cpu-distribution"><div class="chart-box" data-slot="cpuDistributionChart"></div></div>
  </section>

  <section class="card">
    <h2>品牌统计</h2>
    <table>
      <thead><tr><th>品牌</th><th>商品数</th><th>平均价格</th><th>总销量</th><th>市场份额</th><th></th></tr></thead>
      <tbody id="brandTable"></tbody>
    </table>
  </section>

  <section class="card">
    <div class="tabs" data-group="advanced"></div>

    <div data-panel="competitive">
      <form class="filters" id="competitiveForm">
        <select name="brand" data-dropdown="competitive_brand"></select>
        <button class="primary" type="submit">分析</button>
        <span class="spinner hidden">分析中…</span>
      </form>
      <div class="result hidden" id="competitiveResult"></div>
    </div>

    <div data-panel="trend">
      <form class="filters" id="trendForm">
        <select name="brand" data-dropdown="trend_brand"></select>
        <select name="ram" data-dropdown="trend_ram"></select>
        <input name="days" type="number" min="1" placeholder="预测天数">
        <button class="primary" type="submit">预测</button>
        <span class="spinner hidden">预测中…</span>
      </form>
      <div class="result hidden" id="trendResult"></div>
      <div class="chart-box" data-slot="priceTrendChart"></div>
    </div>

    <div data-panel="sentiment">
      <form class="filters" id="sentimentForm">
        <select name="brand" data-dropdown="sentiment_brand"></select>
        <button class="primary" type="submit">分析</button>
        <span class="spinner hidden">分析中…</span>
      </form>
      <div class="result hidden" id="sentimentResult"></div>
    </div>

    <div data-panel="clustering">
      <form class="filters" id="clusteringForm">
        <button class="primary" type="submit">开始聚类</button>
        <span class="spinner hidden">分析中…</span>
      </form>
      <div class="result hidden" id="clusteringResult"></div>
      <div class="chart-box" data-slot="clusteringChart"></div>
    </div>
  </section>
</div>

<script>
const charts = {};

function esc(s) {
  return String(s).replace(/[&<>"']/g, c => ({'&':'&amp;','<':'&lt;','>':'&gt;','"':'&quot;',"'":'&#39;'}[c]));
}

// Band datasets are hidden from legend and tooltip by index.
function prepare(config) {
  const c = JSON.parse(JSON.stringify(config));
  c.options = c.options || {};
  const plugins = c.options.plugins || {};
  const legendHidden = plugins.legend && plugins.legend.hiddenDatasets;
  if (legendHidden) {
    plugins.legend.labels = Object.assign({}, plugins.legend.labels, {
      filter: item => !legendHidden.includes(item.datasetIndex)
    });
    delete plugins.legend.hiddenDatasets;
  }
  const tooltipHidden = plugins.tooltip && plugins.tooltip.hiddenDatasets;
  if (tooltipHidden) {
    plugins.tooltip.filter = item => !tooltipHidden.includes(item.datasetIndex);
    delete plugins.tooltip.hiddenDatasets;
  }
  c.options.responsive = true;
  c.options.maintainAspectRatio = false;
  return c;
}

function renderSlot(slot) {
  const box = document.querySelector(`[data-slot="${slot.id}"]`);
  if (!box) return;
  if (charts[slot.id]) {
    charts[slot.id].destroy();
    delete charts[slot.id];
  }
  box.innerHTML = '';
  if (slot.state === 'chart') {
    const canvas = document.createElement('canvas');
    canvas.id = slot.id;
    box.appendChild(canvas);
    charts[slot.id] = new Chart(canvas, prepare(slot.config));
  } else if (slot.state === 'placeholder') {
    box.innerHTML = `<div class="placeholder">${esc(slot.message)}</div>`;
  }
}

function setLoading(form, loading) {
  form.querySelector('.spinner').classList.toggle('hidden', !loading);
  form.querySelector('button').disabled = loading;
}

function showResult(id, visible, html) {
  const el = document.getElementById(id);
  if (visible) el.innerHTML = html;
  el.classList.toggle('hidden', !visible);
}

async function runPanel(form, url, render) {
  setLoading(form, true);
  try {
    const resp = await fetch(url);
    const body = await resp.json();
    if (body.error) { alert(body.error); return; }
    if (body.update.status === 'stale') return;
    if (body.update.status === 'failed') alert(body.update.message);
    render(body.panel);
  } catch (e) {
    alert('请求失败，请稍后再试');
  } finally {
    setLoading(form, false);
  }
}

// ---------------------------------------------------------------------------
// Overview
// ---------------------------------------------------------------------------

function renderOverview(p) {
  const pct = p.progress.total ? Math.round(p.progress.completed / p.progress.total * 100) : 100;
  document.getElementById('progressBar').style.width = pct + '%';
  document.getElementById('progressStatus').textContent = p.status;
  document.getElementById('totalProducts').textContent = p.summary.total_products;
  document.getElementById('avgPrice').textContent = p.summary.avg_price;
  document.getElementById('totalSales').textContent = p.summary.total_sales;
  document.getElementById('totalBrands').textContent = p.summary.total_brands;
  document.getElementById('correlation').textContent = p.correlation || '--';
  document.getElementById('brandTable').innerHTML = p.brand_rows.map(r => `
    <tr><td>${esc(r.brand)}</td><td>${r.product_count}</td><td>${esc(r.avg_price)}</td>
    <td>${esc(r.total_sales)}</td><td>${esc(r.market_share)}</td>
    <td style="width:120px"><div class="share-bar" style="width:${r.bar_width}%"></div></td></tr>`).join('');
  [p.price_distribution, p.brand_share, p.price_sales, p.ram_distribution, p.cpu_distribution]
    .forEach(renderSlot);
}

async function loadOverview() {
  const resp = await fetch('/view/overview');
  const reader = resp.body.getReader();
  const decoder = new TextDecoder();
  let buf = '';
  for (;;) {
    const { value, done } = await reader.read();
    if (done) break;
    buf += decoder.decode(value, { stream: true });
    let nl;
    while ((nl = buf.indexOf('\n')) >= 0) {
      const line = buf.slice(0, nl);
      buf = buf.slice(nl + 1);
      if (line.trim()) renderOverview(JSON.parse(line));
    }
  }
}

// ---------------------------------------------------------------------------
// Controls
// ---------------------------------------------------------------------------

function fillDropdown(name, dropdown) {
  const select = document.querySelector(`[data-dropdown="${name}"]`);
  select.innerHTML = `<option value="">${esc(dropdown.placeholder)}</option>` +
    dropdown.options.map(o => `<option value="${esc(o)}">${esc(o)}</option>`).join('');
}

async function loadDropdowns() {
  const d = await (await fetch('/view/dropdowns')).json();
  ['competitive_brand', 'trend_brand', 'trend_ram', 'sentiment_brand']
    .forEach(name => fillDropdown(name, d[name]));
}

function applyTab(groupEl, tabs, activeId) {
  tabs.forEach(t => {
    groupEl.querySelector(`[data-tab="${t.id}"]`).classList.toggle('active', t.id === activeId);
    document.querySelector(`[data-panel="${t.target}"]`).classList.toggle('hidden', t.id !== activeId);
  });
  // Charts in a hidden container need a resize once shown.
  Object.values(charts).forEach(c => c.resize());
}

function buildTabs(group, state) {
  const el = document.querySelector(`.tabs[data-group="${group}"]`);
  el.innerHTML = state.tabs.map(t =>
    `<button class="tab" data-tab="${t.id}">${esc(t.label)}</button>`).join('');
  applyTab(el, state.tabs, state.tabs[state.active].id);
  el.querySelectorAll('.tab').forEach(btn => btn.addEventListener('click', async () => {
    const r = await (await fetch(`/view/tab?group=${group}&tab=${btn.dataset.tab}`, { method: 'POST' })).json();
    if (r.active) applyTab(el, state.tabs, r.active.id);
  }));
}

// ---------------------------------------------------------------------------
// Advanced panels
// ---------------------------------------------------------------------------

function renderCompetitive(panel) {
  const v = panel.view;
  showResult('competitiveResult', panel.visible, v && `
    <div class="stats">
      <div class="stat"><div class="value">${v.product_count}</div><div class="label">产品数量</div></div>
      <div class="stat"><div class="value">${esc(v.avg_price)}</div><div class="label">平均价格</div></div>
      <div class="stat"><div class="value">${esc(v.total_sales)}</div><div class="label">总销量</div></div>
      <div class="stat"><div class="value">${esc(v.market_share)}</div><div class="label">市场份额</div></div>
    </div>
    ${v.empty_message ? `<p class="muted">${esc(v.empty_message)}</p>` : ''}
    <div class="competitors">${v.competitors.map(c => `
      <div class="competitor">
        <strong>${esc(c.brand)}</strong> <span class="muted">${c.product_count} 款</span>
        <div>平均价格 ${esc(c.avg_price)} <span class="${c.price_diff.class}">${esc(c.price_diff.text)}</span></div>
        <div>总销量 ${esc(c.total_sales)} <span class="${c.sales_diff.class}">${esc(c.sales_diff.text)}</span></div>
      </div>`).join('')}</div>`);
}

function renderTrend(panel) {
  const v = panel.view;
  showResult('trendResult', panel.visible, v && `
    <p class="muted">${esc(v.filter_info)}</p>
    <div class="stats">
      <div class="stat"><div class="value">${esc(v.current_price)}</div><div class="label">当前均价</div></div>
      <div class="stat"><div class="value">${esc(v.predicted_price)}</div><div class="label">预测价格</div></div>
      <div class="stat"><div class="value">${esc(v.change_percent)}</div><div class="label">变化幅度</div></div>
      <div class="stat"><div class="value ${v.direction.class}">${esc(v.direction.text)}</div><div class="label">趋势</div></div>
    </div>`);
  renderSlot(panel.chart);
}

const STAR_GLYPHS = { full: '★', half: '⯪', empty: '☆' };

function renderSentiment(panel) {
  const v = panel.view;
  showResult('sentimentResult', panel.visible, v && `
    <p class="muted">${esc(v.filter_info)}</p>
    <div class="stats">
      <div class="stat"><div class="value">${esc(v.score)}</div><div class="label">情感得分</div></div>
      <div class="stat"><div class="value">${esc(v.total_reviews)}</div><div class="label">评价总数</div></div>
      <div class="stat"><div class="value">${esc(v.rating.average)}
        <span class="stars">${v.rating.stars.map(s => STAR_GLYPHS[s]).join('')}</span></div>
        <div class="label">平均评分</div></div>
    </div>
    ${v.bars.map(b => `
      <div class="sentiment-row"><span class="label">${esc(b.label)}</span>
        <div class="track"><div class="fill ${b.bucket}" style="width:${b.width}"></div></div>
        <span>${esc(b.text)}</span></div>`).join('')}
    <div>${v.positive_keywords.map(k => `<span class="keyword diff-positive">${esc(k)}</span>`).join('')}</div>
    <div>${v.negative_keywords.map(k => `<span class="keyword diff-negative">${esc(k)}</span>`).join('')}</div>`);
}

function renderClustering(panel) {
  const v = panel.view;
  showResult('clusteringResult', panel.visible, v && `
    <p class="muted">最佳聚类数: ${v.best_k}</p>
    ${v.empty_message ? `<p class="muted">${esc(v.empty_message)}</p>` : ''}
    <div class="clusters">${v.cards.map(c => `
      <div class="cluster">
        <strong>${esc(c.title)}</strong><span class="${c.badge_class}">${esc(c.segment)}</span>
        <p class="muted">${esc(c.summary)}</p>
        <div>平均价格 ${esc(c.avg_price)} · 平均销量 ${esc(c.avg_sales)}</div>
        <div>平均内存 ${esc(c.avg_ram)} · 受欢迎程度 ${esc(c.popularity)}</div>
        ${c.price_range ? `<div>价格区间 ${esc(c.price_range)}</div>` : ''}
        <div class="muted">${c.brands.map(esc).join(' · ')}</div>
      </div>`).join('')}</div>`);
  renderSlot(panel.chart);
}

function query(form, names) {
  const data = new FormData(form);
  return names.map(n => `${n}=${encodeURIComponent(data.get(n) || '')}`).join('&');
}

function bind(id, handler) {
  const form = document.getElementById(id);
  form.addEventListener('submit', e => { e.preventDefault(); handler(form); });
}

bind('competitiveForm', f => runPanel(f, '/view/competitive?' + query(f, ['brand']), renderCompetitive));
bind('trendForm', f => runPanel(f, '/view/trend?' + query(f, ['brand', 'ram', 'days']), renderTrend));
bind('sentimentForm', f => runPanel(f, '/view/sentiment?' + query(f, ['brand']), renderSentiment));
bind('clusteringForm', f => runPanel(f, '/view/clusters', renderClustering));

document.querySelector('[data-dropdown="trend_brand"]').addEventListener('change', async e => {
  const d = await (await fetch('/view/rams?brand=' + encodeURIComponent(e.target.value))).json();
  fillDropdown('trend_ram', d);
});

async function loadHealth() {
  const h = await (await fetch('/view/health')).json();
  const badge = document.getElementById('health');
  badge.textContent = h.backend_ok ? '后端已连接' : '后端不可用';
  badge.className = 'badge ' + (h.backend_ok ? 'ok' : 'fail');
  document.getElementById('backend').textContent = h.base_url;
}

async function init() {
  const state = await (await fetch('/view/state')).json();
  buildTabs('charts', state.chart_tabs);
  buildTabs('advanced', state.advanced_tabs);
  loadHealth();
  await loadDropdowns();
  await loadOverview();
}

init();
</script>
</body>
</html>
"##;
