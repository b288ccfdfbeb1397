//! Table definitions matching `migrations/`.
//!
//! Ids are declared `BigInt` so they load as `i64`; SQLite stores every
//! `INTEGER PRIMARY KEY` as a 64-bit rowid.

diesel::table! {
    actions (id) {
        id -> BigInt,
        ts -> Text,
        bot_handle -> Text,
        action -> Text,
        target_uri -> Text,
        note -> Text,
    }
}

diesel::table! {
    posts_seen (uri) {
        uri -> Text,
        seen_at -> Text,
    }
}

diesel::table! {
    reply_queue (id) {
        id -> BigInt,
        ts -> Text,
        bot_handle -> Text,
        parent_uri -> Text,
        author_handle -> Text,
        source -> Text,
        post_text -> Text,
        llm_reply -> Text,
        status -> Text,
        extra -> Text,
    }
}

diesel::table! {
    state (key) {
        key -> Text,
        value -> Text,
    }
}

diesel::table! {
    thread_memory (bot_handle, user_handle) {
        bot_handle -> Text,
        user_handle -> Text,
        memory_json -> Text,
        updated_ts -> Text,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    actions,
    posts_seen,
    reply_queue,
    state,
    thread_memory,
);
