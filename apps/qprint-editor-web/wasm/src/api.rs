//! Draft API calls over browser `fetch`
//!
//! Every call sends `Authorization: Bearer <token>`. Request bodies are the
//! JSON strings produced by [`EditorSession`](crate::EditorSession)'s
//! `begin*` methods; responses go back to its `finish*` methods as text.

use qprint_editor_core::api::{
    editor_route, CorrectionTask, DraftEndpoints, DraftResponse, UploadResponse,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{FormData, Request, RequestInit, RequestMode, Response};

#[derive(Clone, Copy)]
enum Body<'a> {
    Empty,
    Json(&'a str),
    Form(&'a FormData),
}

/// `GET` the draft; resolves to `{ fileName, signedUrl }`
#[wasm_bindgen(js_name = fetchDraft)]
pub async fn fetch_draft(api_base: String, draft_id: String, token: String) -> Result<JsValue, JsValue> {
    let url = DraftEndpoints::new(&api_base).draft(&draft_id);
    let text = send("GET", &url, &token, Body::Empty).await?;
    let draft: DraftResponse =
        serde_json::from_str(&text).map_err(|e| JsValue::from_str(&e.to_string()))?;
    serde_wasm_bindgen::to_value(&draft).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Upload a source PDF as a new draft; resolves to the draft id
#[wasm_bindgen(js_name = uploadDraftFile)]
pub async fn upload_draft_file(api_base: String, token: String, file: web_sys::File) -> Result<String, JsValue> {
    let form = FormData::new()?;
    form.append_with_blob_and_filename("file", &file, &file.name())?;

    let url = DraftEndpoints::new(&api_base).upload();
    let text = send("POST", &url, &token, Body::Form(&form)).await?;
    let uploaded: UploadResponse =
        serde_json::from_str(&text).map_err(|e| JsValue::from_str(&e.to_string()))?;

    web_sys::console::log_1(&format!("Uploaded draft {}", uploaded.draft_id).into());
    Ok(uploaded.draft_id)
}

/// Client route that opens the editor for a draft, e.g. right after upload
#[wasm_bindgen(js_name = editorRoute)]
pub fn editor_route_for(draft_id: &str) -> String {
    editor_route(draft_id)
}

/// Send edited text items; `body` comes from `EditorSession.beginSave()`
#[wasm_bindgen(js_name = saveEditedPdf)]
pub async fn save_edited_pdf(
    api_base: String,
    draft_id: String,
    token: String,
    body: String,
) -> Result<String, JsValue> {
    let url = DraftEndpoints::new(&api_base).process(&draft_id);
    send("POST", &url, &token, Body::Json(&body)).await
}

/// Run a text-correction task (`spell_fix` or `format_clean`); `body` comes
/// from `EditorSession.beginCorrection()`
#[wasm_bindgen(js_name = requestCorrection)]
pub async fn request_correction(
    api_base: String,
    draft_id: String,
    token: String,
    task: String,
    body: String,
) -> Result<String, JsValue> {
    let task = CorrectionTask::parse(&task)
        .ok_or_else(|| JsValue::from_str(&format!("Unknown correction task: {}", task)))?;
    let url = task.endpoint(&DraftEndpoints::new(&api_base), &draft_id);
    send("POST", &url, &token, Body::Json(&body)).await
}

/// Perform a request and return the response body as text
async fn send(method: &str, url: &str, token: &str, body: Body<'_>) -> Result<String, JsValue> {
    let window = web_sys::window().ok_or("No window")?;

    let opts = RequestInit::new();
    opts.set_method(method);
    opts.set_mode(RequestMode::Cors);
    match body {
        Body::Empty => {}
        Body::Json(json) => opts.set_body(&JsValue::from_str(json)),
        Body::Form(form) => opts.set_body(form),
    }

    let request = Request::new_with_str_and_init(url, &opts)?;
    request
        .headers()
        .set("Authorization", &format!("Bearer {}", token))?;
    if matches!(body, Body::Json(_)) {
        request.headers().set("Content-Type", "application/json")?;
    }

    let response = JsFuture::from(window.fetch_with_request(&request)).await?;
    let response: Response = response.dyn_into()?;

    if !response.ok() {
        web_sys::console::log_1(&format!("{} {} failed: {}", method, url, response.status()).into());
        return Err(JsValue::from_str(&format!(
            "Request failed: {}",
            response.status()
        )));
    }

    let text = JsFuture::from(response.text()?).await?;
    Ok(text.as_string().unwrap_or_default())
}
