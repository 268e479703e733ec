#![allow(missing_docs)]

pub(crate) mod form;
pub(crate) mod html;
pub(crate) mod http;
pub(crate) mod multipart;
pub(crate) mod state;

pub(crate) use form::{
    assert_form_error_message, assert_form_input, assert_form_input_with_value,
    assert_form_submit_button, assert_hx_endpoint, must_get_form,
};
pub(crate) use html::{assert_valid_html, parse_html_document, parse_html_fragment, select_texts};
pub(crate) use http::{assert_hx_redirect, get_header};
pub(crate) use multipart::MultipartBuilder;
pub(crate) use state::{TEST_PASSWORD, create_user, demo_state, remote_state};
