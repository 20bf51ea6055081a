/*
 * lib.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of newcurl, a minimal HTTP(S), FTP and Telnet client.
 *
 * newcurl is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * newcurl is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with newcurl.  If not, see <http://www.gnu.org/licenses/>.
 */

//! C FFI for the newcurl core. One call per HTTP verb plus FTP/Telnet passthrough; each returns
//! a newly allocated `NewcurlResponse` (free with newcurl_response_free) or NULL on failure, in
//! which case newcurl_last_error describes what went wrong.
//! All string parameters are UTF-8 NUL-terminated.

use libc::{c_char, c_int};
use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::future::Future;
use std::ptr;

use newcurl_core::{Client, ClientConfig, ClientError, HttpResponse, Method};

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    let msg = CString::new(msg.replace('\0', " ")).unwrap_or_default();
    LAST_ERROR.with(|e| *e.borrow_mut() = Some(msg));
}

fn clear_last_error() {
    LAST_ERROR.with(|e| *e.borrow_mut() = None);
}

/// Shared runtime that drives the async core; every FFI call blocks on it until done.
fn runtime() -> Option<&'static tokio::runtime::Runtime> {
    static RUNTIME: once_cell::sync::OnceCell<tokio::runtime::Runtime> =
        once_cell::sync::OnceCell::new();
    RUNTIME
        .get_or_try_init(|| {
            tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
        })
        .map_err(|e| set_last_error(&format!("failed to create runtime: {}", e)))
        .ok()
}

/// Response returned to C. Strings are NULL when absent.
#[repr(C)]
pub struct NewcurlResponse {
    pub status_code: c_int,
    pub headers: *mut c_char,
    pub body: *mut c_char,
}

/// C strings end at the first NUL, so anything after an embedded NUL is dropped.
fn to_c_string(s: Option<String>) -> *mut c_char {
    match s {
        Some(mut s) => {
            if let Some(nul) = s.find('\0') {
                s.truncate(nul);
            }
            CString::new(s).map(CString::into_raw).unwrap_or(ptr::null_mut())
        }
        None => ptr::null_mut(),
    }
}

fn into_c_response(response: HttpResponse) -> *mut NewcurlResponse {
    Box::into_raw(Box::new(NewcurlResponse {
        status_code: response.status_code,
        headers: to_c_string(response.headers),
        body: to_c_string(response.body),
    }))
}

/// Borrow a C string argument. NULL (`required`) and invalid UTF-8 set the last error.
unsafe fn arg<'a>(ptr: *const c_char, name: &str, required: bool) -> Result<Option<&'a str>, ()> {
    if ptr.is_null() {
        if required {
            set_last_error(&format!("{} is NULL", name));
            return Err(());
        }
        return Ok(None);
    }
    CStr::from_ptr(ptr).to_str().map(Some).map_err(|_| {
        set_last_error(&format!("{} is not valid UTF-8", name));
    })
}

/// Run one client call to completion and convert the outcome for C.
fn complete<F>(call: impl FnOnce(Client) -> F) -> *mut NewcurlResponse
where
    F: Future<Output = Result<HttpResponse, ClientError>>,
{
    clear_last_error();
    let Some(rt) = runtime() else {
        return ptr::null_mut();
    };
    let client = Client::with_config(ClientConfig::from_env());
    match rt.block_on(call(client)) {
        Ok(response) => into_c_response(response),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

unsafe fn http(url: *const c_char, method: Method, body: *const c_char) -> *mut NewcurlResponse {
    let Ok(Some(url)) = arg(url, "url", true) else {
        return ptr::null_mut();
    };
    let Ok(body) = arg(body, "body", false) else {
        return ptr::null_mut();
    };
    let url = url.to_owned();
    let body = body.map(|b| b.as_bytes().to_vec());
    complete(|client| async move { client.request(&url, method, body.as_deref()).await })
}

/// Version string (static, do not free).
#[no_mangle]
pub extern "C" fn newcurl_version() -> *const c_char {
    b"0.1.0\0".as_ptr() as *const c_char
}

/// Last error message from a failed call on this thread. Valid until next FFI call. Do not free.
#[no_mangle]
pub extern "C" fn newcurl_last_error() -> *const c_char {
    LAST_ERROR.with(|e| {
        e.borrow()
            .as_ref()
            .map(|s| s.as_ptr())
            .unwrap_or(ptr::null())
    })
}

#[no_mangle]
pub unsafe extern "C" fn newcurl_http_get(url: *const c_char) -> *mut NewcurlResponse {
    http(url, Method::Get, ptr::null())
}

/// body may be NULL (sent as Content-Length: 0).
#[no_mangle]
pub unsafe extern "C" fn newcurl_http_post(url: *const c_char, body: *const c_char) -> *mut NewcurlResponse {
    http(url, Method::Post, body)
}

#[no_mangle]
pub unsafe extern "C" fn newcurl_http_put(url: *const c_char, body: *const c_char) -> *mut NewcurlResponse {
    http(url, Method::Put, body)
}

#[no_mangle]
pub unsafe extern "C" fn newcurl_http_delete(url: *const c_char) -> *mut NewcurlResponse {
    http(url, Method::Delete, ptr::null())
}

#[no_mangle]
pub unsafe extern "C" fn newcurl_http_update(url: *const c_char, body: *const c_char) -> *mut NewcurlResponse {
    http(url, Method::Update, body)
}

#[no_mangle]
pub unsafe extern "C" fn newcurl_http_trace(url: *const c_char) -> *mut NewcurlResponse {
    http(url, Method::Trace, ptr::null())
}

#[no_mangle]
pub unsafe extern "C" fn newcurl_http_head(url: *const c_char) -> *mut NewcurlResponse {
    http(url, Method::Head, ptr::null())
}

#[no_mangle]
pub unsafe extern "C" fn newcurl_http_options(url: *const c_char) -> *mut NewcurlResponse {
    http(url, Method::Options, ptr::null())
}

/// Send an FTP command (CRLF appended); the reply is returned as the body with status 0.
#[no_mangle]
pub unsafe extern "C" fn newcurl_ftp_request(url: *const c_char, command: *const c_char) -> *mut NewcurlResponse {
    let (Ok(Some(url)), Ok(Some(command))) = (arg(url, "url", true), arg(command, "command", true)) else {
        return ptr::null_mut();
    };
    let (url, command) = (url.to_owned(), command.to_owned());
    complete(|client| async move { client.ftp(&url, &command).await })
}

/// Send a Telnet command verbatim; the reply is returned as the body with status 0.
#[no_mangle]
pub unsafe extern "C" fn newcurl_telnet_request(url: *const c_char, command: *const c_char) -> *mut NewcurlResponse {
    let (Ok(Some(url)), Ok(Some(command))) = (arg(url, "url", true), arg(command, "command", true)) else {
        return ptr::null_mut();
    };
    let (url, command) = (url.to_owned(), command.to_owned());
    complete(|client| async move { client.telnet(&url, &command).await })
}

/// Not implemented: always NULL, with the reason in newcurl_last_error.
#[no_mangle]
pub unsafe extern "C" fn newcurl_ssh_request(url: *const c_char, command: *const c_char) -> *mut NewcurlResponse {
    let (Ok(Some(url)), Ok(Some(command))) = (arg(url, "url", true), arg(command, "command", true)) else {
        return ptr::null_mut();
    };
    let (url, command) = (url.to_owned(), command.to_owned());
    complete(|client| async move { client.ssh(&url, &command).await })
}

/// Free a response and the strings inside it. No-op if ptr is NULL.
#[no_mangle]
pub unsafe extern "C" fn newcurl_response_free(ptr: *mut NewcurlResponse) {
    if ptr.is_null() {
        return;
    }
    let response = Box::from_raw(ptr);
    if !response.headers.is_null() {
        let _ = CString::from_raw(response.headers);
    }
    if !response.body.is_null() {
        let _ = CString::from_raw(response.body);
    }
}
