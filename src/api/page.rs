//! The browser page. Self-contained — inline CSS and JS, no external
//! resources, so the tool works without internet access.

pub const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="de">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Castfolio — Exposé-Generator</title>
<style>
  :root {
    --green: #2E7D32;
    --blue: #1565C0;
    --bg: #f5f6f4;
    --card: #ffffff;
    --border: #d9ddd6;
  }
  * { box-sizing: border-box; }
  body {
    font-family: -apple-system, "Segoe UI", Roboto, sans-serif;
    background: var(--bg);
    color: #222;
    margin: 0;
    padding: 24px 16px 64px;
  }
  main { max-width: 760px; margin: 0 auto; }
  h1 { color: var(--green); font-size: 1.6em; margin-bottom: 4px; }
  .sub { color: #666; margin-top: 0; }
  section {
    background: var(--card);
    border: 1px solid var(--border);
    border-radius: 10px;
    padding: 18px 20px;
    margin: 18px 0;
  }
  section h2 { color: var(--blue); font-size: 1.1em; margin-top: 0; }
  label { display: block; font-weight: 600; margin: 10px 0 4px; }
  input[type=file] { width: 100%; }
  textarea {
    width: 100%;
    min-height: 110px;
    border: 1px solid var(--border);
    border-radius: 6px;
    padding: 8px;
    font: inherit;
  }
  #expose-edit { min-height: 320px; font-family: ui-monospace, monospace; }
  button {
    background: var(--green);
    color: #fff;
    border: none;
    border-radius: 6px;
    padding: 10px 18px;
    font-size: 1em;
    cursor: pointer;
    margin-top: 10px;
  }
  button.secondary { background: var(--blue); }
  button:disabled { background: #aaa; cursor: wait; }
  ul#file-list { padding-left: 18px; margin: 8px 0 0; }
  ul#file-list li { margin: 2px 0; }
  .dup { color: #b26a00; }
  #status { margin-top: 10px; min-height: 1.2em; }
  #status.error { color: #b00020; }
  #status.ok { color: var(--green); }
</style>
</head>
<body>
<main>
  <h1>🌻 Castfolio</h1>
  <p class="sub">Unterlagen hochladen, Exposé prüfen, als PDF exportieren.</p>

  <section>
    <h2>1. Unterlagen</h2>
    <label for="documents">Dokumente (PDF, Word, PNG, JPG)</label>
    <input type="file" id="documents" multiple
           accept=".pdf,.doc,.docx,.png,.jpg,.jpeg">
    <label for="photos">Fotos (PNG, JPG, WEBP)</label>
    <input type="file" id="photos" multiple accept=".png,.jpg,.jpeg,.webp">
    <label for="manual-text">Textinformationen (E-Mail, Notizen)</label>
    <textarea id="manual-text"
              placeholder="Hier Text aus E-Mails oder Telefonnotizen einfügen…"></textarea>
    <button id="analyze-btn">Unterlagen analysieren</button>
    <ul id="file-list"></ul>
  </section>

  <section>
    <h2>2. Exposé prüfen und bearbeiten</h2>
    <textarea id="expose-edit"
              placeholder="Das extrahierte Exposé erscheint hier…"></textarea>
    <button id="save-btn" class="secondary">Änderungen übernehmen</button>
    <button id="export-btn">Als PDF exportieren</button>
  </section>

  <p id="status"></p>
</main>
<script>
let sessionId = null;

const status = (msg, cls) => {
  const el = document.getElementById('status');
  el.textContent = msg;
  el.className = cls || '';
};

async function api(method, path, body, headers) {
  const res = await fetch(path, { method, body, headers });
  if (!res.ok) {
    let msg = res.statusText;
    try { msg = (await res.json()).error.message; } catch (e) {}
    throw new Error(msg);
  }
  return res;
}

async function ensureSession() {
  if (sessionId) return sessionId;
  const res = await api('POST', '/api/sessions');
  sessionId = (await res.json()).session_id;
  return sessionId;
}

async function uploadKind(inputId, kind) {
  const files = document.getElementById(inputId).files;
  if (!files.length) return [];
  const form = new FormData();
  form.append('kind', kind);
  for (const f of files) form.append('file', f, f.name);
  const res = await api('POST', `/api/sessions/${sessionId}/files`, form);
  return (await res.json()).files;
}

function listFiles(files) {
  const list = document.getElementById('file-list');
  for (const f of files) {
    const li = document.createElement('li');
    li.textContent = `${f.original_name} (${f.category})`;
    if (f.duplicate.status !== 'new') {
      li.textContent += ' — bereits hochgeladen?';
      li.className = 'dup';
    }
    list.appendChild(li);
  }
}

document.getElementById('analyze-btn').addEventListener('click', async () => {
  const btn = document.getElementById('analyze-btn');
  btn.disabled = true;
  try {
    await ensureSession();
    listFiles(await uploadKind('documents', 'document'));
    listFiles(await uploadKind('photos', 'photo'));
    document.getElementById('documents').value = '';
    document.getElementById('photos').value = '';

    const text = document.getElementById('manual-text').value;
    await api('PUT', `/api/sessions/${sessionId}/text`,
      JSON.stringify({ text }), { 'Content-Type': 'application/json' });

    status('Analysiere Unterlagen… das kann eine Minute dauern.');
    const res = await api('POST', `/api/sessions/${sessionId}/extract`);
    const extraction = await res.json();
    document.getElementById('expose-edit').value = extraction.markdown;
    status('Exposé erstellt. Bitte prüfen und bei Bedarf anpassen.', 'ok');
  } catch (e) {
    status(e.message, 'error');
  } finally {
    btn.disabled = false;
  }
});

document.getElementById('save-btn').addEventListener('click', async () => {
  try {
    await ensureSession();
    const markdown = document.getElementById('expose-edit').value;
    await api('PUT', `/api/sessions/${sessionId}/expose`,
      JSON.stringify({ markdown }), { 'Content-Type': 'application/json' });
    status('Änderungen gespeichert.', 'ok');
  } catch (e) {
    status(e.message, 'error');
  }
});

document.getElementById('export-btn').addEventListener('click', async () => {
  try {
    await ensureSession();
    const markdown = document.getElementById('expose-edit').value;
    if (markdown.trim()) {
      await api('PUT', `/api/sessions/${sessionId}/expose`,
        JSON.stringify({ markdown }), { 'Content-Type': 'application/json' });
    }
    const res = await api('POST', `/api/sessions/${sessionId}/export`);
    const blob = await res.blob();
    const disposition = res.headers.get('Content-Disposition') || '';
    const match = disposition.match(/filename="([^"]+)"/);
    const a = document.createElement('a');
    a.href = URL.createObjectURL(blob);
    a.download = match ? match[1] : 'Expose_Familie.pdf';
    a.click();
    URL.revokeObjectURL(a.href);
    status('PDF exportiert.', 'ok');
  } catch (e) {
    status(e.message, 'error');
  }
});
</script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_is_self_contained() {
        assert!(INDEX_HTML.contains("<!DOCTYPE html>"));
        // No external fetches besides our own API
        assert!(!INDEX_HTML.contains("http://"));
        assert!(!INDEX_HTML.contains("https://"));
        assert!(!INDEX_HTML.contains("<link"));
    }

    #[test]
    fn page_targets_all_endpoints() {
        for path in ["/api/sessions", "/files", "/text", "/extract", "/expose", "/export"] {
            assert!(INDEX_HTML.contains(path), "missing {path}");
        }
    }
}
