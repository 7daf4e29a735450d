table! {
    comment (id) {
        id -> Int4,
        post_id -> Int4,
        author_id -> Int4,
        text -> Text,
        published -> Timestamp,
    }
}

table! {
    group_ (id) {
        id -> Int4,
        title -> Varchar,
        slug -> Varchar,
        description -> Text,
        published -> Timestamp,
    }
}

table! {
    post (id) {
        id -> Int4,
        text -> Text,
        author_id -> Int4,
        group_id -> Nullable<Int4>,
        image -> Nullable<Text>,
        published -> Timestamp,
        updated -> Nullable<Timestamp>,
    }
}

table! {
    post_like (id) {
        id -> Int4,
        post_id -> Int4,
        user_id -> Int4,
        published -> Timestamp,
    }
}

table! {
    user_ (id) {
        id -> Int4,
        name -> Varchar,
        password_encrypted -> Text,
        email -> Nullable<Text>,
        published -> Timestamp,
        updated -> Nullable<Timestamp>,
    }
}

table! {
    user_follow (id) {
        id -> Int4,
        user_id -> Int4,
        author_id -> Int4,
        published -> Timestamp,
    }
}

joinable!(comment -> post (post_id));
joinable!(comment -> user_ (author_id));
joinable!(post -> group_ (group_id));
joinable!(post -> user_ (author_id));
joinable!(post_like -> post (post_id));
joinable!(post_like -> user_ (user_id));

allow_tables_to_appear_in_same_query!(
    comment,
    group_,
    post,
    post_like,
    user_,
    user_follow,
);
