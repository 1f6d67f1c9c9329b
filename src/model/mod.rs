pub(crate) mod video_item;
